use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

use crate::collector::DataCollector;

/// Reports the host's name
#[derive(Debug, Default, Clone)]
pub struct HostnamePlugin;

#[async_trait]
impl DataCollector for HostnamePlugin {
    fn name(&self) -> &str {
        "hostname"
    }

    async fn collect(&self) -> anyhow::Result<serde_json::Value> {
        let hostname = hostname::get().context("failed to read hostname")?;
        Ok(json!({ "hostname": hostname.to_string_lossy() }))
    }
}
