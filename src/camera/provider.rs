//! Camera loading from a settings scope.

use super::{CameraPtr, SimulatedCamera};
use crate::config::ConfigScope;

/// Opens the camera described by a settings scope.
pub trait CameraProvider: Send + Sync {
    fn load(&self, scope: &dyn ConfigScope) -> Option<CameraPtr>;
}

const DEFAULT_WIDTH: u32 = 1280;
const DEFAULT_HEIGHT: u32 = 1024;

/// Builds cameras from `Type`, `Name`, `Width` and `Height` keys.
///
/// Only the `Simulated` backend is handled here (it is also the default
/// when `Type` is absent). A scope without a `Name` has no camera.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettingsCameraProvider;

impl CameraProvider for SettingsCameraProvider {
    fn load(&self, scope: &dyn ConfigScope) -> Option<CameraPtr> {
        let Some(name) = scope.value("Name") else {
            tracing::debug!(group = %scope.group_path(), "No camera configured");
            return None;
        };

        let backend = scope.value("Type").unwrap_or_else(|| "Simulated".to_string());
        if backend != "Simulated" {
            tracing::warn!("Camera backend '{}' is not available for '{}'", backend, name);
            return None;
        }

        let width = scope.parse_value("Width").unwrap_or(DEFAULT_WIDTH);
        let height = scope.parse_value("Height").unwrap_or(DEFAULT_HEIGHT);

        tracing::debug!(%name, width, height, "Opened simulated camera");
        Some(Box::new(SimulatedCamera::new(name, width, height)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    #[test]
    fn test_loads_simulated_camera() {
        let settings = Settings::new()
            .with_value("Name", "left")
            .with_value("Width", "640");
        let camera = SettingsCameraProvider.load(&settings).unwrap();
        assert_eq!(camera.name(), "left");
        assert_eq!(camera.info().id, "Simulated:left");
        assert_eq!(camera.info().width, 640);
        assert_eq!(camera.info().height, DEFAULT_HEIGHT);
    }

    #[test]
    fn test_no_name_no_camera() {
        assert!(SettingsCameraProvider.load(&Settings::new()).is_none());
    }

    #[test]
    fn test_unknown_backend() {
        let settings = Settings::new()
            .with_value("Name", "left")
            .with_value("Type", "GigE");
        assert!(SettingsCameraProvider.load(&settings).is_none());
    }
}
