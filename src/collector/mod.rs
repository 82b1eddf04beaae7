mod adapters;
mod config;
mod core;
mod wrapper;

// Re-export public items
pub use adapters::{BlockingCollector, FnCollector};
pub use config::{CollectionConfig, CollectionConfigBuilder};
pub use core::{DataCollector, MetricResult, PluginFailure};
pub use wrapper::collector_wrapper;
