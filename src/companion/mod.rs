//! Per-system companion objects.
//!
//! Companions (configuration panels) are created on demand for a live
//! [`StereoSystem`](crate::system::StereoSystem) and cached by system
//! identity until that system is destroyed.

mod cache;
mod panel;

pub use cache::CompanionCache;
pub use panel::{ConfigPanel, DualCameraConfigPanel, FieldValue, PanelField, PlaceholderPanel};

/// Cache of configuration panels, one per live system.
pub type ConfigPanelCache = CompanionCache<ConfigPanel>;
