use super::core::DataCollector;
use anyhow::Context;
use std::future::Future;
use std::sync::Arc;

/// A plugin backed by an async closure
pub struct FnCollector<F> {
    name: String,
    collect_fn: F,
}

impl<F, Fut> FnCollector<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<serde_json::Value>> + Send + 'static,
{
    /// Create a new closure-backed plugin
    pub fn new(name: impl Into<String>, collect_fn: F) -> Self {
        Self {
            name: name.into(),
            collect_fn,
        }
    }
}

#[async_trait::async_trait]
impl<F, Fut> DataCollector for FnCollector<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<serde_json::Value>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn collect(&self) -> anyhow::Result<serde_json::Value> {
        (self.collect_fn)().await
    }
}

/// A plugin backed by a synchronous closure that may block
///
/// The closure runs on tokio's blocking pool so a slow syscall or file read
/// does not stall the runtime's worker threads.
pub struct BlockingCollector<F> {
    name: String,
    collect_fn: Arc<F>,
}

impl<F> BlockingCollector<F>
where
    F: Fn() -> anyhow::Result<serde_json::Value> + Send + Sync + 'static,
{
    /// Create a new blocking plugin
    pub fn new(name: impl Into<String>, collect_fn: F) -> Self {
        Self {
            name: name.into(),
            collect_fn: Arc::new(collect_fn),
        }
    }
}

#[async_trait::async_trait]
impl<F> DataCollector for BlockingCollector<F>
where
    F: Fn() -> anyhow::Result<serde_json::Value> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn collect(&self) -> anyhow::Result<serde_json::Value> {
        let collect_fn = Arc::clone(&self.collect_fn);
        tokio::task::spawn_blocking(move || (*collect_fn)())
            .await
            .with_context(|| format!("blocking plugin '{}' did not complete", self.name))?
    }
}
