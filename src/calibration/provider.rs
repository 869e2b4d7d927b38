//! Calibration loading from a settings scope.

use std::path::PathBuf;
use std::sync::Arc;

use super::data::MultiCameraCalibration;
use crate::config::ConfigScope;

/// Loads a multi-camera calibration described by a settings scope.
///
/// Missing or unusable calibration is reported as `None`.
pub trait CalibrationProvider: Send + Sync {
    fn load(&self, scope: &dyn ConfigScope) -> Option<Arc<MultiCameraCalibration>>;
}

/// Reads the calibration file named by the `ConfigFile` key.
///
/// Relative paths are resolved against `base_dir` when one is set.
#[derive(Debug, Clone, Default)]
pub struct FileCalibrationProvider {
    pub base_dir: Option<PathBuf>,
}

impl FileCalibrationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve(&self, file: &str) -> PathBuf {
        let path = PathBuf::from(file);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        }
    }
}

impl CalibrationProvider for FileCalibrationProvider {
    fn load(&self, scope: &dyn ConfigScope) -> Option<Arc<MultiCameraCalibration>> {
        let Some(file) = scope.value("ConfigFile") else {
            tracing::debug!(group = %scope.group_path(), "No calibration file configured");
            return None;
        };

        let path = self.resolve(&file);
        match MultiCameraCalibration::load(&path) {
            Ok(calibration) => {
                tracing::info!(
                    path = %path.display(),
                    views = calibration.camera_count(),
                    "Loaded calibration"
                );
                Some(Arc::new(calibration))
            }
            Err(e) => {
                tracing::warn!("Failed to load calibration {}: {}", path.display(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::CameraCalibration;
    use crate::config::Settings;

    #[test]
    fn test_missing_key_yields_none() {
        let settings = Settings::new();
        assert!(FileCalibrationProvider::new().load(&settings).is_none());
    }

    #[test]
    fn test_unreadable_file_yields_none() {
        let settings = Settings::new().with_value("ConfigFile", "does-not-exist.json");
        let provider = FileCalibrationProvider::with_base_dir("/nonexistent");
        assert!(provider.load(&settings).is_none());
    }

    #[test]
    fn test_loads_relative_file() {
        let dir = std::env::temp_dir();
        let name = format!("stereo_sls_provider_{}.json", std::process::id());
        let calibration = MultiCameraCalibration::new(vec![
            CameraCalibration::pinhole("camera", 640, 480, 700.0),
            CameraCalibration::pinhole("projector", 1024, 768, 900.0),
        ])
        .unwrap();
        calibration.save(&dir.join(&name)).unwrap();

        let settings = Settings::new().with_value("ConfigFile", name.as_str());
        let loaded = FileCalibrationProvider::with_base_dir(&dir).load(&settings);
        let _ = std::fs::remove_file(dir.join(&name));

        assert_eq!(loaded.as_deref(), Some(&calibration));
    }
}
