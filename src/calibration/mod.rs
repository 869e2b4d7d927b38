//! Multi-camera calibration resources.

mod data;
mod provider;

pub use data::{CalibrationError, CameraCalibration, MultiCameraCalibration};
pub use provider::{CalibrationProvider, FileCalibrationProvider};
