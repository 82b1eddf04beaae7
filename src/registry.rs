use log::{debug, warn};
use std::sync::{Arc, PoisonError, RwLock};

use crate::collector::DataCollector;
use crate::error::{DetectiveError, Result};

/// Ordered, append-only catalog of plugins
///
/// A registry lives independently of any collection pass; each pass takes a
/// [`snapshot`](Self::snapshot) at its start, so plugins registered while a
/// pass is running are picked up by the next one.
pub struct PluginRegistry {
    plugins: RwLock<Vec<Arc<dyn DataCollector>>>,
}

impl PluginRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            plugins: RwLock::new(Vec::new()),
        }
    }

    /// Register a plugin at the end of the traversal order
    ///
    /// Duplicate names are accepted; within a single collection the later
    /// arriving result for a shared name replaces the earlier one.
    pub fn register(&self, plugin: Arc<dyn DataCollector>) -> Result<()> {
        let name = plugin.name();
        if name.trim().is_empty() {
            return Err(DetectiveError::Registry(
                "plugin name must not be empty".to_string(),
            ));
        }

        // The list is only ever appended to, so a poisoned lock still guards
        // a consistent value.
        let mut plugins = self.plugins.write().unwrap_or_else(PoisonError::into_inner);

        if plugins.iter().any(|p| p.name() == name) {
            warn!("Plugin '{}' is already registered; results will share one key", name);
        }

        debug!("Registered plugin '{}'", name);
        plugins.push(plugin);

        Ok(())
    }

    /// Register a concrete plugin value
    pub fn register_plugin<P: DataCollector>(&self, plugin: P) -> Result<()> {
        self.register(Arc::new(plugin))
    }

    /// Get the registered plugins in registration order
    pub fn snapshot(&self) -> Vec<Arc<dyn DataCollector>> {
        self.plugins
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Count the registered plugins
    pub fn len(&self) -> usize {
        self.plugins.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Check whether no plugin is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get all plugin names in registration order
    pub fn names(&self) -> Vec<String> {
        self.plugins
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Check if a plugin exists by name
    pub fn contains_name(&self, name: &str) -> bool {
        self.plugins
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|p| p.name() == name)
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::FnCollector;
    use serde_json::json;

    fn plugin(name: &str) -> Arc<dyn DataCollector> {
        Arc::new(FnCollector::new(name, || async { Ok(json!(null)) }))
    }

    #[test]
    fn test_snapshot_preserves_registration_order() {
        let registry = PluginRegistry::new();
        for name in ["cpu", "memory", "disk"] {
            registry.register(plugin(name)).unwrap();
        }

        let names: Vec<_> = registry
            .snapshot()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, vec!["cpu", "memory", "disk"]);
        assert_eq!(registry.len(), 3);
        assert!(registry.contains_name("memory"));
        assert!(!registry.contains_name("network"));
    }

    #[test]
    fn test_empty_registry() {
        let registry = PluginRegistry::default();
        assert!(registry.is_empty());
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn test_rejects_blank_name() {
        let registry = PluginRegistry::new();
        let err = registry.register(plugin("  ")).unwrap_err();
        assert!(matches!(err, DetectiveError::Registry(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_accepts_duplicate_names() {
        let registry = PluginRegistry::new();
        registry.register(plugin("cpu")).unwrap();
        registry.register(plugin("cpu")).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["cpu", "cpu"]);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let registry = PluginRegistry::new();
        registry.register(plugin("cpu")).unwrap();
        let snapshot = registry.snapshot();

        registry.register(plugin("memory")).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.len(), 2);
    }
}
