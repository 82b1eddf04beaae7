//! Core plugin traits and result types
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A unit of work that produces one named metric value per invocation
///
/// Implementations are registered with a [`PluginRegistry`](crate::registry::PluginRegistry)
/// and invoked once per collection pass, each in its own task. The value is
/// opaque to the pipeline; it is carried as JSON so plugins can report
/// anything from a single number to a nested document.
#[async_trait]
pub trait DataCollector: Send + Sync + 'static {
    /// Get the plugin name, used as the key in a [`Collection`](crate::collection::Collection)
    fn name(&self) -> &str;

    /// Invoke the plugin once
    async fn collect(&self) -> anyhow::Result<serde_json::Value>;
}

/// The value produced by one successful plugin invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    /// Name of the plugin that produced this result
    pub plugin_name: String,
    /// The metric payload
    pub value: serde_json::Value,
    /// When the invocation finished
    pub collected_at: DateTime<Utc>,
    /// How long the invocation took in milliseconds
    pub elapsed_ms: u64,
}

impl MetricResult {
    /// Create a new result stamped with the current time
    pub fn new(plugin_name: impl Into<String>, value: serde_json::Value, elapsed_ms: u64) -> Self {
        Self {
            plugin_name: plugin_name.into(),
            value,
            collected_at: Utc::now(),
            elapsed_ms,
        }
    }
}

/// Out-of-band failure of a single plugin invocation
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("plugin '{plugin_name}' failed: {reason}")]
pub struct PluginFailure {
    /// Name of the plugin that failed
    pub plugin_name: String,
    /// Human readable failure cause
    pub reason: String,
    /// Whether the plugin panicked rather than returning an error
    pub panicked: bool,
    /// When the failure was observed
    pub failed_at: DateTime<Utc>,
}

impl PluginFailure {
    /// A plugin returned an error
    pub fn failed(plugin_name: impl Into<String>, err: &anyhow::Error) -> Self {
        Self {
            plugin_name: plugin_name.into(),
            // Alternate formatting keeps the whole context chain
            reason: format!("{:#}", err),
            panicked: false,
            failed_at: Utc::now(),
        }
    }

    /// A plugin panicked during invocation
    pub fn panicked(plugin_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            plugin_name: plugin_name.into(),
            reason: message.into(),
            panicked: true,
            failed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_failure_keeps_context_chain() {
        let err = std::fs::read_to_string("/nonexistent/detective")
            .context("reading probe file")
            .unwrap_err();

        let failure = PluginFailure::failed("probe", &err);
        assert_eq!(failure.plugin_name, "probe");
        assert!(failure.reason.starts_with("reading probe file: "));
        assert!(!failure.panicked);
        assert!(failure.to_string().contains("plugin 'probe' failed"));
    }

    #[test]
    fn test_panicked_failure() {
        let failure = PluginFailure::panicked("boom", "index out of bounds");
        assert!(failure.panicked);
        assert_eq!(failure.reason, "index out of bounds");
    }
}
