//! Pattern projection resources.
//!
//! Describes the Gray code sequence a projector displays during a scan.

mod pattern;
mod provider;

pub use pattern::{gray_to_binary, binary_to_gray, PatternDirection, PatternFrame, PatternProjection};
pub use provider::{PatternProjectionProvider, SettingsPatternProjectionProvider};
