use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::collector::{MetricResult, PluginFailure};

/// Results of one collection pass keyed by plugin name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    /// Successful results
    pub items: HashMap<String, MetricResult>,
    /// Plugins that failed during the pass
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub failures: HashMap<String, PluginFailure>,
    /// When the pass started
    pub collected_at: DateTime<Utc>,
}

impl Collection {
    /// Create a new empty collection
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
            failures: HashMap::new(),
            collected_at: Utc::now(),
        }
    }

    /// Insert a result under its plugin name, replacing any earlier one
    pub fn insert(&mut self, result: MetricResult) {
        if let Some(previous) = self.items.insert(result.plugin_name.clone(), result) {
            warn!(
                "Duplicate result for plugin '{}'; keeping the later one",
                previous.plugin_name
            );
        }
    }

    /// Record a failed plugin
    pub fn record_failure(&mut self, failure: PluginFailure) {
        self.failures.insert(failure.plugin_name.clone(), failure);
    }

    /// Get the result for a plugin
    pub fn get(&self, plugin_name: &str) -> Option<&MetricResult> {
        self.items.get(plugin_name)
    }

    /// Get the failure for a plugin
    pub fn failure(&self, plugin_name: &str) -> Option<&PluginFailure> {
        self.failures.get(plugin_name)
    }

    /// Number of successful results
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Plugin names with a result, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.items.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Whether every plugin in the pass succeeded
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

impl Default for Collection {
    fn default() -> Self {
        Self::new()
    }
}
