//! Pattern projection loading from a settings scope.

use std::sync::Arc;

use super::pattern::PatternProjection;
use crate::config::ConfigScope;

/// Loads pattern projection settings described by a settings scope.
pub trait PatternProjectionProvider: Send + Sync {
    fn load(&self, scope: &dyn ConfigScope) -> Option<Arc<PatternProjection>>;
}

/// Reads a Gray code projection from the `PatternProjection` group.
///
/// `Width` and `Height` are required; `Inverted` and `References` default
/// to `true`. A `Type` other than `GrayCode` is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettingsPatternProjectionProvider;

impl SettingsPatternProjectionProvider {
    const GROUP: &'static str = "PatternProjection";

    fn key(name: &str) -> String {
        format!("{}/{}", Self::GROUP, name)
    }
}

impl PatternProjectionProvider for SettingsPatternProjectionProvider {
    fn load(&self, scope: &dyn ConfigScope) -> Option<Arc<PatternProjection>> {
        if !scope.contains_group(Self::GROUP) {
            tracing::debug!(group = %scope.group_path(), "No pattern projection group");
            return None;
        }

        if let Some(kind) = scope.value(&Self::key("Type")) {
            if kind != "GrayCode" {
                tracing::warn!("Unsupported pattern projection type: {}", kind);
                return None;
            }
        }

        let width: Option<u32> = scope.parse_value(&Self::key("Width"));
        let height: Option<u32> = scope.parse_value(&Self::key("Height"));
        let (width, height) = match (width, height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
            _ => {
                tracing::warn!("Pattern projection needs a positive Width and Height");
                return None;
            }
        };

        let mut projection = PatternProjection::new(width, height);
        if let Some(inverted) = scope.parse_value::<bool>(&Self::key("Inverted")) {
            projection.inverted = inverted;
        }
        if let Some(references) = scope.parse_value::<bool>(&Self::key("References")) {
            projection.references = references;
        }

        tracing::debug!(width, height, frames = projection.frame_count(), "Loaded pattern projection");
        Some(Arc::new(projection))
    }
}
