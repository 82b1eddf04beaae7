use anyhow::{Context, anyhow};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;

use crate::collector::DataCollector;

const PROC_MEMINFO: &str = "/proc/meminfo";

/// Memory usage in kibibytes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryInfo {
    pub total_kb: u64,
    pub free_kb: u64,
    pub available_kb: u64,
    pub used_kb: u64,
    pub swap_total_kb: u64,
    pub swap_free_kb: u64,
}

/// Reports memory usage from /proc/meminfo
#[derive(Debug, Default, Clone)]
pub struct MemoryPlugin;

#[async_trait]
impl DataCollector for MemoryPlugin {
    fn name(&self) -> &str {
        "memory"
    }

    async fn collect(&self) -> anyhow::Result<serde_json::Value> {
        let content = tokio::fs::read_to_string(PROC_MEMINFO)
            .await
            .with_context(|| format!("failed to read {}", PROC_MEMINFO))?;
        Ok(serde_json::to_value(parse_meminfo(&content)?)?)
    }
}

/// Parse /proc/meminfo content into the fields this plugin reports
pub fn parse_meminfo(content: &str) -> anyhow::Result<MemoryInfo> {
    let fields: HashMap<&str, u64> = content
        .lines()
        .filter_map(|line| {
            let (key, rest) = line.split_once(':')?;
            let value = rest.split_whitespace().next()?.parse().ok()?;
            Some((key.trim(), value))
        })
        .collect();

    let get = |key: &str| -> anyhow::Result<u64> {
        fields
            .get(key)
            .copied()
            .ok_or_else(|| anyhow!("{} missing from {}", key, PROC_MEMINFO))
    };

    let total_kb = get("MemTotal")?;
    let free_kb = get("MemFree")?;
    // Kernels before 3.14 lack MemAvailable
    let available_kb = get("MemAvailable").unwrap_or(free_kb);

    Ok(MemoryInfo {
        total_kb,
        free_kb,
        available_kb,
        used_kb: total_kb.saturating_sub(available_kb),
        swap_total_kb: get("SwapTotal").unwrap_or(0),
        swap_free_kb: get("SwapFree").unwrap_or(0),
    })
}
