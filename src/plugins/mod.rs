//! Built-in host plugins.
//!
//! Each plugin reads one piece of host state per invocation. The /proc based
//! plugins only succeed on Linux; elsewhere they fail like any other plugin
//! and the pass carries on without them.

mod hostname;
mod loadavg;
mod memory;
mod uptime;

use log::debug;
use std::sync::Arc;

use crate::collector::DataCollector;
use crate::error::{DetectiveError, Result};
use crate::registry::PluginRegistry;

pub use self::hostname::HostnamePlugin;
pub use self::loadavg::{LoadAverage, LoadAveragePlugin, parse_loadavg};
pub use self::memory::{MemoryInfo, MemoryPlugin, parse_meminfo};
pub use self::uptime::{Uptime, UptimePlugin, parse_uptime};

/// All built-in plugins in registration order
pub fn builtin() -> Vec<Arc<dyn DataCollector>> {
    vec![
        Arc::new(HostnamePlugin),
        Arc::new(UptimePlugin),
        Arc::new(LoadAveragePlugin),
        Arc::new(MemoryPlugin),
    ]
}

/// Register built-in plugins with `registry`
///
/// An empty `enabled` list registers every built-in plugin; otherwise only
/// the named ones, in the order given. Returns how many were registered.
pub fn register_builtin(registry: &PluginRegistry, enabled: &[String]) -> Result<usize> {
    let available = builtin();

    if enabled.is_empty() {
        let count = available.len();
        for plugin in available {
            registry.register(plugin)?;
        }
        return Ok(count);
    }

    for name in enabled {
        let plugin = available
            .iter()
            .find(|p| p.name() == name.as_str())
            .ok_or_else(|| DetectiveError::Config(format!("Unknown plugin: {}", name)))?;
        debug!("Enabling built-in plugin '{}'", name);
        registry.register(Arc::clone(plugin))?;
    }

    Ok(enabled.len())
}
