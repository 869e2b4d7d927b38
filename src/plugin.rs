//! Stereo structured light plugin entry points.
//!
//! Bundles assembly and config panel lookup behind the interface a host
//! application uses to discover and drive structured light systems.

use std::sync::Arc;

use crate::assembly::SystemAssembler;
use crate::companion::{ConfigPanel, ConfigPanelCache};
use crate::config::ConfigScope;
use crate::system::StereoSystem;

/// Plugin exposing dual camera and projector+camera stereo systems.
#[derive(Default)]
pub struct StereoSlsPlugin {
    assembler: SystemAssembler,
    panels: ConfigPanelCache,
}

impl StereoSlsPlugin {
    pub fn new(assembler: SystemAssembler) -> Self {
        Self {
            assembler,
            panels: ConfigPanelCache::default(),
        }
    }

    pub fn id(&self) -> &'static str {
        "stereo-sls"
    }

    pub fn name(&self) -> &'static str {
        "Stereo Structured Light"
    }

    pub fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// Build the system described by `settings`, or `None` if any required
    /// resource is unavailable.
    pub fn get(&self, settings: &mut dyn ConfigScope) -> Option<Arc<StereoSystem>> {
        self.assembler.assemble(settings)
    }

    /// Config panel for `system`, shared for as long as the system lives.
    pub fn config_panel(&self, system: &Arc<StereoSystem>) -> Arc<ConfigPanel> {
        self.panels.get(system)
    }

    pub fn panels(&self) -> &ConfigPanelCache {
        &self.panels
    }
}
