//! Hierarchical settings scopes.
//!
//! Settings are a tree of named groups holding string values. A scope keeps a
//! stack of entered groups; lookups are relative to the innermost group and
//! may use slash separated paths (`"PatternProjection/Width"`).

mod scope;
mod settings;

pub use scope::{ConfigScope, ScopedGroup};
pub use settings::{Settings, SettingsError, SettingsNode};
