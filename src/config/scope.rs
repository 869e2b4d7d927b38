//! Scope trait and the RAII group guard.

use std::ops::{Deref, DerefMut};

/// Read access to a hierarchical key/value configuration with group navigation.
pub trait ConfigScope {
    /// Value stored under `key`, relative to the current group.
    fn value(&self, key: &str) -> Option<String>;

    /// Whether a nested group named `name` exists in the current group.
    fn contains_group(&self, name: &str) -> bool;

    /// Enter a nested group. Entering a group that does not exist is allowed;
    /// every lookup inside it simply returns `None`.
    fn begin_group(&mut self, name: &str);

    /// Leave the innermost group. Calling this at the root is a no-op.
    fn end_group(&mut self);

    /// Slash separated path of the current group ("" at the root).
    fn group_path(&self) -> String;
}

impl dyn ConfigScope + '_ {
    /// Parse a value, returning `None` when it is missing or malformed.
    pub fn parse_value<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.value(key).and_then(|v| v.trim().parse().ok())
    }
}

/// A group entered on a scope for as long as the guard lives.
///
/// Dropping the guard leaves the group again, on every exit path.
pub struct ScopedGroup<'a> {
    scope: &'a mut dyn ConfigScope,
}

impl<'a> ScopedGroup<'a> {
    pub fn enter(scope: &'a mut dyn ConfigScope, name: &str) -> Self {
        scope.begin_group(name);
        Self { scope }
    }
}

impl<'a> Deref for ScopedGroup<'a> {
    type Target = dyn ConfigScope + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.scope
    }
}

impl<'a> DerefMut for ScopedGroup<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.scope
    }
}

impl Drop for ScopedGroup<'_> {
    fn drop(&mut self) {
        self.scope.end_group();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    #[test]
    fn test_scoped_group_restores_on_drop() {
        let mut settings = Settings::new().with_value("Cameras/Left/Name", "left");
        {
            let mut cameras = ScopedGroup::enter(&mut settings, "Cameras");
            assert_eq!(cameras.group_path(), "Cameras");
            {
                let left = ScopedGroup::enter(&mut *cameras, "Left");
                assert_eq!(left.value("Name").as_deref(), Some("left"));
            }
            assert_eq!(cameras.group_path(), "Cameras");
        }
        assert_eq!(settings.group_path(), "");
    }

    #[test]
    fn test_scoped_group_restores_on_early_return() {
        fn read_missing(scope: &mut dyn ConfigScope) -> Option<String> {
            let group = ScopedGroup::enter(scope, "Missing");
            let value = group.value("Anything")?;
            Some(value)
        }

        let mut settings = Settings::new();
        assert!(read_missing(&mut settings).is_none());
        assert_eq!(settings.group_path(), "");
    }
}
