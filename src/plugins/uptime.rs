use anyhow::{Context, anyhow};
use async_trait::async_trait;
use serde::Serialize;

use crate::collector::DataCollector;

const PROC_UPTIME: &str = "/proc/uptime";

/// Time since boot as reported by the kernel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Uptime {
    /// Seconds since boot
    pub uptime_seconds: f64,
    /// Seconds all CPUs spent idle
    pub idle_seconds: f64,
}

/// Reports system uptime from /proc/uptime
#[derive(Debug, Default, Clone)]
pub struct UptimePlugin;

#[async_trait]
impl DataCollector for UptimePlugin {
    fn name(&self) -> &str {
        "uptime"
    }

    async fn collect(&self) -> anyhow::Result<serde_json::Value> {
        let content = tokio::fs::read_to_string(PROC_UPTIME)
            .await
            .with_context(|| format!("failed to read {}", PROC_UPTIME))?;
        let uptime = parse_uptime(&content)?;
        Ok(serde_json::to_value(uptime)?)
    }
}

/// Parse /proc/uptime content, e.g. "43200.42 12345.67"
pub fn parse_uptime(content: &str) -> anyhow::Result<Uptime> {
    let mut parts = content.split_whitespace();

    let mut field = |name: &str| -> anyhow::Result<f64> {
        let raw = parts
            .next()
            .ok_or_else(|| anyhow!("missing {} field in {}", name, PROC_UPTIME))?;
        raw.parse::<f64>()
            .with_context(|| format!("invalid {} value '{}'", name, raw))
    };

    Ok(Uptime {
        uptime_seconds: field("uptime")?,
        idle_seconds: field("idle")?,
    })
}
