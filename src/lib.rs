//! Concurrent metric collection from pluggable data collectors

pub mod collection;
pub mod collector;
pub mod config;
pub mod detective;
pub mod error;
pub mod fanin;
#[cfg(feature = "builtin")]
pub mod plugins;
pub mod registry;
pub mod sync;
pub mod util;

pub use detective::{Detective, collect_all_metrics};

/// Re-export of commonly used types for convenience
pub mod prelude {
    pub use crate::collection::Collection;
    pub use crate::collector::{
        BlockingCollector, CollectionConfig, DataCollector, FnCollector, MetricResult,
        PluginFailure,
    };
    pub use crate::detective::{Detective, collect_all_metrics};
    pub use crate::error::{DetectiveError, Result};
    pub use crate::registry::PluginRegistry;
}

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
