//! System assembly from settings.
//!
//! The assembler reads the `Mode` key, loads the calibration from the
//! `StereoCalibration` group and the pattern projection from the current
//! group, then opens the cameras the topology needs:
//!
//! | Mode               | Cameras                          |
//! |--------------------|----------------------------------|
//! | `DualCamera`       | `Cameras/Left`, `Cameras/Right`  |
//! | `Projector+Camera` | `Camera`                         |
//!
//! Calibration and projection are required by every topology and are
//! checked before any camera is opened. A system is returned only when
//! every resource loaded; otherwise nothing is built and the loaded
//! resources are dropped.

use std::sync::Arc;

use crate::calibration::{CalibrationProvider, FileCalibrationProvider};
use crate::camera::{CameraProvider, CameraPtr, SettingsCameraProvider};
use crate::config::{ConfigScope, ScopedGroup};
use crate::projection::{PatternProjectionProvider, SettingsPatternProjectionProvider};
use crate::system::StereoSystem;

/// Camera topology selected by the `Mode` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StereoMode {
    /// Two cameras triangulate against each other.
    DualCamera,
    /// One camera triangulates against the projector.
    ProjectorCamera,
}

impl StereoMode {
    pub fn parse(mode: &str) -> Option<Self> {
        match mode {
            "DualCamera" => Some(StereoMode::DualCamera),
            "Projector+Camera" => Some(StereoMode::ProjectorCamera),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StereoMode::DualCamera => "DualCamera",
            StereoMode::ProjectorCamera => "Projector+Camera",
        }
    }
}

impl std::fmt::Display for StereoMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a system could not be assembled. Every variant carries the mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    /// Calibration missing or unusable
    MissingCalibration { mode: String },
    /// Pattern projection missing or unusable
    MissingPatternProjection { mode: String },
    /// At least one of the stereo cameras failed to load
    MissingCameras { mode: String, left: bool, right: bool },
    /// The projector+camera camera failed to load
    MissingCamera { mode: String },
    /// `Mode` names no known topology
    UnknownMode(String),
}

impl AssemblyError {
    /// The mode that was being assembled.
    pub fn mode(&self) -> &str {
        match self {
            AssemblyError::MissingCalibration { mode }
            | AssemblyError::MissingPatternProjection { mode }
            | AssemblyError::MissingCameras { mode, .. }
            | AssemblyError::MissingCamera { mode }
            | AssemblyError::UnknownMode(mode) => mode,
        }
    }
}

impl std::fmt::Display for AssemblyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn status(loaded: bool) -> &'static str {
            if loaded {
                "ok"
            } else {
                "missing"
            }
        }

        match self {
            AssemblyError::MissingCalibration { mode } => {
                write!(f, "failed to load stereo calibration for '{}'", mode)
            }
            AssemblyError::MissingPatternProjection { mode } => {
                write!(f, "failed to load pattern projection for '{}'", mode)
            }
            AssemblyError::MissingCameras { mode, left, right } => write!(
                f,
                "failed to load cameras for '{}' (left: {}, right: {})",
                mode,
                status(*left),
                status(*right)
            ),
            AssemblyError::MissingCamera { mode } => {
                write!(f, "failed to load camera for '{}'", mode)
            }
            AssemblyError::UnknownMode(mode) => write!(f, "unknown stereo mode: '{}'", mode),
        }
    }
}

impl std::error::Error for AssemblyError {}

/// Builds [`StereoSystem`]s from settings using pluggable resource loaders.
pub struct SystemAssembler {
    calibration: Box<dyn CalibrationProvider>,
    projection: Box<dyn PatternProjectionProvider>,
    cameras: Box<dyn CameraProvider>,
}

impl Default for SystemAssembler {
    fn default() -> Self {
        Self::new(
            Box::new(FileCalibrationProvider::new()),
            Box::new(SettingsPatternProjectionProvider),
            Box::new(SettingsCameraProvider),
        )
    }
}

impl SystemAssembler {
    pub fn new(
        calibration: Box<dyn CalibrationProvider>,
        projection: Box<dyn PatternProjectionProvider>,
        cameras: Box<dyn CameraProvider>,
    ) -> Self {
        Self {
            calibration,
            projection,
            cameras,
        }
    }

    /// Assemble a system, logging the reason on failure.
    pub fn assemble(&self, settings: &mut dyn ConfigScope) -> Option<Arc<StereoSystem>> {
        match self.try_assemble(settings) {
            Ok(system) => Some(system),
            Err(e) => {
                tracing::warn!(mode = %e.mode(), "{}", e);
                None
            }
        }
    }

    /// Assemble a system. `settings` is left in the group it was passed in.
    pub fn try_assemble(
        &self,
        settings: &mut dyn ConfigScope,
    ) -> Result<Arc<StereoSystem>, AssemblyError> {
        let mode = settings.value("Mode").unwrap_or_default();

        let calibration = {
            let group = ScopedGroup::enter(settings, "StereoCalibration");
            self.calibration.load(&*group)
        };
        let calibration = calibration.ok_or_else(|| AssemblyError::MissingCalibration {
            mode: mode.clone(),
        })?;

        let projection = self.projection.load(&*settings).ok_or_else(|| {
            AssemblyError::MissingPatternProjection { mode: mode.clone() }
        })?;

        let system = match StereoMode::parse(&mode) {
            Some(StereoMode::DualCamera) => {
                let (left, right) = {
                    let mut cameras = ScopedGroup::enter(settings, "Cameras");
                    let left = self.load_camera(&mut *cameras, "Left");
                    let right = self.load_camera(&mut *cameras, "Right");
                    (left, right)
                };

                match (left, right) {
                    (Some(left), Some(right)) => {
                        StereoSystem::dual_camera(left, right, calibration, projection)
                    }
                    (left, right) => {
                        return Err(AssemblyError::MissingCameras {
                            mode,
                            left: left.is_some(),
                            right: right.is_some(),
                        });
                    }
                }
            }
            Some(StereoMode::ProjectorCamera) => {
                let camera = self
                    .load_camera(settings, "Camera")
                    .ok_or_else(|| AssemblyError::MissingCamera { mode: mode.clone() })?;
                StereoSystem::single_camera(camera, calibration, projection)
            }
            None => return Err(AssemblyError::UnknownMode(mode)),
        };

        tracing::info!(
            id = %system.id(),
            mode = %mode,
            cameras = system.cameras().len(),
            "Assembled structured light system"
        );
        Ok(system)
    }

    fn load_camera(&self, settings: &mut dyn ConfigScope, group: &str) -> Option<CameraPtr> {
        let group = ScopedGroup::enter(settings, group);
        self.cameras.load(&*group)
    }
}
