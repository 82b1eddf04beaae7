use anyhow::{Context, anyhow, bail};
use async_trait::async_trait;
use serde::Serialize;

use crate::collector::DataCollector;

const PROC_LOADAVG: &str = "/proc/loadavg";

/// Run queue load averages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadAverage {
    pub one_minute: f64,
    pub five_minutes: f64,
    pub fifteen_minutes: f64,
    /// Currently runnable scheduling entities
    pub running: u32,
    /// Total scheduling entities
    pub total: u32,
}

/// Reports load averages from /proc/loadavg
#[derive(Debug, Default, Clone)]
pub struct LoadAveragePlugin;

#[async_trait]
impl DataCollector for LoadAveragePlugin {
    fn name(&self) -> &str {
        "loadavg"
    }

    async fn collect(&self) -> anyhow::Result<serde_json::Value> {
        let content = tokio::fs::read_to_string(PROC_LOADAVG)
            .await
            .with_context(|| format!("failed to read {}", PROC_LOADAVG))?;
        Ok(serde_json::to_value(parse_loadavg(&content)?)?)
    }
}

/// Parse /proc/loadavg content, e.g. "0.52 0.58 0.59 1/1024 12345"
pub fn parse_loadavg(content: &str) -> anyhow::Result<LoadAverage> {
    let parts: Vec<&str> = content.split_whitespace().collect();
    if parts.len() < 4 {
        bail!("expected at least 4 fields in {}, found {}", PROC_LOADAVG, parts.len());
    }

    let average = |idx: usize| -> anyhow::Result<f64> {
        parts[idx]
            .parse::<f64>()
            .with_context(|| format!("invalid load average '{}'", parts[idx]))
    };

    let (running, total) = parts[3]
        .split_once('/')
        .ok_or_else(|| anyhow!("process field '{}' is not running/total", parts[3]))?;

    Ok(LoadAverage {
        one_minute: average(0)?,
        five_minutes: average(1)?,
        fifteen_minutes: average(2)?,
        running: running
            .parse()
            .with_context(|| format!("invalid running count '{}'", running))?,
        total: total
            .parse()
            .with_context(|| format!("invalid total count '{}'", total))?,
    })
}
