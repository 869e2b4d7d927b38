//! Assembled structured light systems.
//!
//! A [`StereoSystem`] owns its camera handles and shares the calibration and
//! pattern projection it was built with. Systems are only created by the
//! assembler and always hold every resource their topology needs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::calibration::MultiCameraCalibration;
use crate::camera::{Camera, CameraPtr};
use crate::lifecycle::Lifecycle;
use crate::projection::PatternProjection;

static NEXT_SYSTEM_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a system instance. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SystemId(u64);

impl SystemId {
    fn next() -> Self {
        SystemId(NEXT_SYSTEM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for SystemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sls-{}", self.0)
    }
}

/// Concrete kind of a system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemKind {
    DualCamera,
    SingleCamera,
}

impl SystemKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            SystemKind::DualCamera => "Dual camera stereo",
            SystemKind::SingleCamera => "Projector + camera stereo",
        }
    }
}

/// Reconstruction tunables shared between a system and its config panel.
#[derive(Debug, Clone, PartialEq)]
pub struct StereoParameters {
    /// Maximum distance between matched rays for a point to be kept.
    pub max_valid_distance: f64,
    /// Publish decoded images while scanning.
    pub debug_show_decoded_images: bool,
    /// Publish fringe point overlays while scanning.
    pub debug_show_fringes: bool,
}

impl Default for StereoParameters {
    fn default() -> Self {
        Self {
            max_valid_distance: 0.001,
            debug_show_decoded_images: false,
            debug_show_fringes: false,
        }
    }
}

/// Camera arrangement and the handles it owns.
#[derive(Debug)]
pub enum Topology {
    /// Two synchronized cameras, projector only provides texture.
    DualCamera { left: CameraPtr, right: CameraPtr },
    /// One camera paired with a calibrated projector.
    SingleCamera { camera: CameraPtr },
}

/// A fully assembled structured light system.
#[derive(Debug)]
pub struct StereoSystem {
    // First field so destruction observers run before resources are released
    lifecycle: Lifecycle,
    id: SystemId,
    topology: Topology,
    calibration: Arc<MultiCameraCalibration>,
    projection: Arc<PatternProjection>,
    parameters: RwLock<StereoParameters>,
}

impl StereoSystem {
    pub(crate) fn dual_camera(
        left: CameraPtr,
        right: CameraPtr,
        calibration: Arc<MultiCameraCalibration>,
        projection: Arc<PatternProjection>,
    ) -> Arc<Self> {
        Self::build(Topology::DualCamera { left, right }, calibration, projection)
    }

    pub(crate) fn single_camera(
        camera: CameraPtr,
        calibration: Arc<MultiCameraCalibration>,
        projection: Arc<PatternProjection>,
    ) -> Arc<Self> {
        Self::build(Topology::SingleCamera { camera }, calibration, projection)
    }

    fn build(
        topology: Topology,
        calibration: Arc<MultiCameraCalibration>,
        projection: Arc<PatternProjection>,
    ) -> Arc<Self> {
        Arc::new(Self {
            lifecycle: Lifecycle::new(),
            id: SystemId::next(),
            topology,
            calibration,
            projection,
            parameters: RwLock::new(StereoParameters::default()),
        })
    }

    pub fn id(&self) -> SystemId {
        self.id
    }

    pub fn kind(&self) -> SystemKind {
        match self.topology {
            Topology::DualCamera { .. } => SystemKind::DualCamera,
            Topology::SingleCamera { .. } => SystemKind::SingleCamera,
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Cameras in calibration order (left, right / the single camera).
    pub fn cameras(&self) -> Vec<&dyn Camera> {
        match &self.topology {
            Topology::DualCamera { left, right } => vec![&**left, &**right],
            Topology::SingleCamera { camera } => vec![&**camera],
        }
    }

    pub fn calibration(&self) -> &Arc<MultiCameraCalibration> {
        &self.calibration
    }

    pub fn projection(&self) -> &Arc<PatternProjection> {
        &self.projection
    }

    /// Snapshot of the current tunables.
    pub fn parameters(&self) -> StereoParameters {
        self.parameters.read().clone()
    }

    pub fn update_parameters<F>(&self, update: F)
    where
        F: FnOnce(&mut StereoParameters),
    {
        update(&mut self.parameters.write());
    }

    /// Run `callback` once, when this system is destroyed.
    pub fn on_destroy<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.lifecycle.on_destroy(callback);
    }

    /// Number of destruction observers currently registered.
    pub fn observer_count(&self) -> usize {
        self.lifecycle.subscriber_count()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::calibration::CameraCalibration;
    use crate::camera::SimulatedCamera;
    use std::sync::atomic::AtomicBool;

    pub(crate) fn calibration() -> Arc<MultiCameraCalibration> {
        Arc::new(
            MultiCameraCalibration::new(vec![
                CameraCalibration::pinhole("left", 1280, 1024, 1400.0),
                CameraCalibration::pinhole("right", 1280, 1024, 1400.0).with_translation([-100.0, 0.0, 0.0]),
            ])
            .unwrap(),
        )
    }

    pub(crate) fn projection() -> Arc<PatternProjection> {
        Arc::new(PatternProjection::new(1280, 800))
    }

    pub(crate) fn camera(name: &str) -> CameraPtr {
        Box::new(SimulatedCamera::new(name, 1280, 1024))
    }

    pub(crate) fn dual_system() -> Arc<StereoSystem> {
        StereoSystem::dual_camera(camera("left"), camera("right"), calibration(), projection())
    }

    pub(crate) fn single_system() -> Arc<StereoSystem> {
        StereoSystem::single_camera(camera("cam"), calibration(), projection())
    }

    #[test]
    fn test_kind_and_cameras() {
        let dual = dual_system();
        assert_eq!(dual.kind(), SystemKind::DualCamera);
        let names: Vec<&str> = dual.cameras().into_iter().map(|c| c.name()).collect();
        assert_eq!(names, ["left", "right"]);

        let single = single_system();
        assert_eq!(single.kind(), SystemKind::SingleCamera);
        assert_eq!(single.cameras().len(), 1);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = dual_system();
        let b = dual_system();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_resources_are_shared() {
        let calibration = calibration();
        let projection = projection();
        let a = StereoSystem::single_camera(camera("a"), calibration.clone(), projection.clone());
        let b = StereoSystem::single_camera(camera("b"), calibration.clone(), projection.clone());
        assert!(Arc::ptr_eq(a.calibration(), b.calibration()));
        assert!(Arc::ptr_eq(a.projection(), &projection));
    }

    #[test]
    fn test_parameters_update() {
        let system = dual_system();
        system.update_parameters(|p| {
            p.max_valid_distance = 0.5;
            p.debug_show_fringes = true;
        });
        let params = system.parameters();
        assert_eq!(params.max_valid_distance, 0.5);
        assert!(params.debug_show_fringes);
        assert!(!params.debug_show_decoded_images);
    }

    #[test]
    fn test_destroy_notification() {
        let destroyed = Arc::new(AtomicBool::new(false));
        let system = single_system();
        {
            let destroyed = destroyed.clone();
            system.on_destroy(move || destroyed.store(true, Ordering::SeqCst));
        }
        let clone = system.clone();
        drop(system);
        assert!(!destroyed.load(Ordering::SeqCst));
        drop(clone);
        assert!(destroyed.load(Ordering::SeqCst));
    }
}
