//! Named custom validation hooks.
//!
//! Definition files cannot carry code, so a variant names its hook and the
//! embedding program supplies the function under that name.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use polymodel_core::{ModelInstance, ValidateHook};

/// Hook functions keyed by the names definition files use.
#[derive(Clone, Default)]
pub struct HookTable {
    hooks: HashMap<String, ValidateHook>,
}

impl HookTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a hook.
    pub fn insert<F>(&mut self, name: impl Into<String>, hook: F)
    where
        F: Fn(&ModelInstance) -> Result<(), String> + Send + Sync + 'static,
    {
        self.hooks.insert(name.into(), Arc::new(hook));
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with<F>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&ModelInstance) -> Result<(), String> + Send + Sync + 'static,
    {
        self.insert(name, hook);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ValidateHook> {
        self.hooks.get(name)
    }

    /// Registered hook names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.hooks.keys().map(String::as_str).collect();
        names.sort();
        names
    }
}

impl fmt::Debug for HookTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookTable").field("hooks", &self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_sorted() {
        let table = HookTable::new()
            .with("shark_rules", |_| Ok(()))
            .with("salmon_rules", |_| Err("never".into()));
        assert_eq!(table.names(), vec!["salmon_rules", "shark_rules"]);
        assert!(table.get("shark_rules").is_some());
        assert!(table.get("goblin_rules").is_none());
        assert!(format!("{table:?}").contains("salmon_rules"));
    }
}
