use serde::Deserialize;

/// Configuration for a collection pass
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CollectionConfig {
    /// Capacity of the merged result channel
    pub merge_buffer: usize,
    /// Record per-plugin failures in the returned collection
    pub report_failures: bool,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            merge_buffer: 1,
            report_failures: true,
        }
    }
}

/// Builder for collection configuration
pub struct CollectionConfigBuilder {
    config: CollectionConfig,
}

impl CollectionConfigBuilder {
    /// Create a new collection config builder
    pub fn new() -> Self {
        Self {
            config: CollectionConfig::default(),
        }
    }

    /// Set the merged channel capacity (values below 1 are raised to 1)
    pub fn merge_buffer(mut self, size: usize) -> Self {
        self.config.merge_buffer = size.max(1);
        self
    }

    /// Set whether failures are recorded in the collection
    pub fn report_failures(mut self, report: bool) -> Self {
        self.config.report_failures = report;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CollectionConfig {
        self.config
    }
}

impl Default for CollectionConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
