//! Calibration data and its file formats.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Error loading, saving or validating a calibration.
#[derive(Debug)]
pub enum CalibrationError {
    /// File could not be read or written
    Io(std::io::Error),
    /// JSON file could not be parsed or written
    Json(serde_json::Error),
    /// XML file could not be parsed
    XmlParse(quick_xml::DeError),
    /// XML file could not be written
    XmlWrite(quick_xml::SeError),
    /// Calibration contents are not usable
    Invalid(String),
}

impl std::fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalibrationError::Io(e) => write!(f, "Calibration I/O error: {}", e),
            CalibrationError::Json(e) => write!(f, "Calibration JSON error: {}", e),
            CalibrationError::XmlParse(e) => write!(f, "Calibration XML parse error: {}", e),
            CalibrationError::XmlWrite(e) => write!(f, "Calibration XML write error: {}", e),
            CalibrationError::Invalid(msg) => write!(f, "Invalid calibration: {}", msg),
        }
    }
}

impl std::error::Error for CalibrationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CalibrationError::Io(e) => Some(e),
            CalibrationError::Json(e) => Some(e),
            CalibrationError::XmlParse(e) => Some(e),
            CalibrationError::XmlWrite(e) => Some(e),
            CalibrationError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for CalibrationError {
    fn from(e: std::io::Error) -> Self {
        CalibrationError::Io(e)
    }
}

/// Intrinsics and pose of one view (camera or projector).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraCalibration {
    /// View name, matches the camera or projector it was computed for.
    pub name: String,
    /// Sensor width in pixels.
    pub width: u32,
    /// Sensor height in pixels.
    pub height: u32,
    /// Focal length X in pixels.
    pub fx: f64,
    /// Focal length Y in pixels.
    pub fy: f64,
    /// Principal point X.
    pub cx: f64,
    /// Principal point Y.
    pub cy: f64,
    /// Lens distortion coefficients (k1, k2, p1, p2, k3...).
    #[serde(default)]
    pub distortion: Vec<f64>,
    /// Rotation relative to the reference view (3x3, row-major).
    pub rotation: [f64; 9],
    /// Translation relative to the reference view.
    pub translation: [f64; 3],
}

impl CameraCalibration {
    /// Identity-pose calibration with a centered principal point.
    pub fn pinhole(name: impl Into<String>, width: u32, height: u32, focal: f64) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            fx: focal,
            fy: focal,
            cx: width as f64 / 2.0,
            cy: height as f64 / 2.0,
            distortion: Vec::new(),
            rotation: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            translation: [0.0; 3],
        }
    }

    /// Same calibration translated by `offset`.
    pub fn with_translation(mut self, offset: [f64; 3]) -> Self {
        self.translation = offset;
        self
    }

    fn validate(&self) -> Result<(), CalibrationError> {
        if self.width == 0 || self.height == 0 {
            return Err(CalibrationError::Invalid(format!(
                "view '{}' has zero resolution",
                self.name
            )));
        }
        if !(self.fx > 0.0 && self.fy > 0.0) {
            return Err(CalibrationError::Invalid(format!(
                "view '{}' has non-positive focal length",
                self.name
            )));
        }
        Ok(())
    }
}

/// Calibration of every view taking part in triangulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "MultiCameraCalibration")]
pub struct MultiCameraCalibration {
    /// One entry per view, index 0 is the reference.
    #[serde(rename = "camera")]
    pub cameras: Vec<CameraCalibration>,
}

impl MultiCameraCalibration {
    pub fn new(cameras: Vec<CameraCalibration>) -> Result<Self, CalibrationError> {
        let calibration = Self { cameras };
        calibration.validate()?;
        Ok(calibration)
    }

    /// Triangulation needs at least two views, each with sane intrinsics.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        if self.cameras.len() < 2 {
            return Err(CalibrationError::Invalid(format!(
                "need at least 2 views, found {}",
                self.cameras.len()
            )));
        }
        self.cameras.iter().try_for_each(CameraCalibration::validate)
    }

    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    pub fn camera(&self, index: usize) -> Option<&CameraCalibration> {
        self.cameras.get(index)
    }

    /// Distance between the optical centers of two views.
    pub fn baseline(&self, a: usize, b: usize) -> Option<f64> {
        let ta = self.cameras.get(a)?.translation;
        let tb = self.cameras.get(b)?.translation;
        let d: f64 = ta.iter().zip(tb.iter()).map(|(x, y)| (x - y).powi(2)).sum();
        Some(d.sqrt())
    }

    /// Load a calibration file. `.json` is read as JSON, anything else as XML.
    pub fn load(path: &Path) -> Result<Self, CalibrationError> {
        let contents = std::fs::read_to_string(path)?;

        let calibration: Self = if is_json(path) {
            serde_json::from_str(&contents).map_err(CalibrationError::Json)?
        } else {
            quick_xml::de::from_str(&contents).map_err(CalibrationError::XmlParse)?
        };

        calibration.validate()?;
        Ok(calibration)
    }

    /// Save to `.json` or XML, chosen by extension like [`Self::load`].
    pub fn save(&self, path: &Path) -> Result<(), CalibrationError> {
        let contents = if is_json(path) {
            serde_json::to_string_pretty(self).map_err(CalibrationError::Json)?
        } else {
            quick_xml::se::to_string(self).map_err(CalibrationError::XmlWrite)?
        };

        std::fs::write(path, contents)?;
        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
