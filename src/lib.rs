//! Stereo Structured Light Systems
//!
//! Assembles structured light scanning systems from declarative settings:
//! - Dual camera stereo or single camera + projector topologies
//! - Multi-camera calibration and Gray code pattern projection resources
//! - Per-system configuration panels cached for the system's lifetime
//! - Decoded pattern data exchanged between decoding and triangulation

pub mod assembly;
pub mod calibration;
pub mod camera;
pub mod companion;
pub mod config;
pub mod decoded_pattern;
pub mod lifecycle;
pub mod plugin;
pub mod projection;
pub mod system;
pub mod telemetry;

pub use assembly::{AssemblyError, StereoMode, SystemAssembler};
pub use companion::{CompanionCache, ConfigPanel, DualCameraConfigPanel, PlaceholderPanel};
pub use config::{ConfigScope, ScopedGroup, Settings, SettingsError};
pub use decoded_pattern::DecodedPattern;
pub use plugin::StereoSlsPlugin;
pub use system::{StereoParameters, StereoSystem, SystemId, SystemKind};
