//! Camera handles and their loading from settings.
//!
//! Frame capture and driver enumeration live behind the [`Camera`] trait;
//! this module only deals with obtaining handles.

mod provider;

pub use provider::{CameraProvider, SettingsCameraProvider};

/// Information about a camera handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraInfo {
    /// Unique id (backend + name)
    pub id: String,
    /// Human readable name
    pub name: String,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
}

/// A connected or simulated image source.
pub trait Camera: Send + Sync + std::fmt::Debug {
    fn info(&self) -> &CameraInfo;

    fn name(&self) -> &str {
        &self.info().name
    }
}

/// Owned camera handle, moved into the system that uses it.
pub type CameraPtr = Box<dyn Camera>;

/// Camera without hardware, used for offline processing and tests.
#[derive(Debug, Clone)]
pub struct SimulatedCamera {
    info: CameraInfo,
}

impl SimulatedCamera {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        let name = name.into();
        Self {
            info: CameraInfo {
                id: format!("Simulated:{}", name),
                name,
                width,
                height,
            },
        }
    }
}

impl Camera for SimulatedCamera {
    fn info(&self) -> &CameraInfo {
        &self.info
    }
}
