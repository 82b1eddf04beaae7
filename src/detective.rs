//! Collection orchestration over every registered plugin.

use log::{debug, info};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::collection::Collection;
use crate::collector::{CollectionConfig, DataCollector, collector_wrapper};
use crate::fanin::fanin;
use crate::registry::PluginRegistry;
use crate::sync::CompletionCounter;

/// Runs collection passes over a plugin registry
pub struct Detective {
    registry: Arc<PluginRegistry>,
    config: CollectionConfig,
}

impl Detective {
    /// Create a detective with default collection settings
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self::with_config(registry, CollectionConfig::default())
    }

    /// Create a detective with custom collection settings
    pub fn with_config(registry: Arc<PluginRegistry>, config: CollectionConfig) -> Self {
        Self { registry, config }
    }

    /// Get the registry this detective collects from
    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    /// Get the collection settings
    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    /// Run every registered plugin once and gather their results
    ///
    /// Each plugin runs in its own task; results are merged as they arrive
    /// and keyed by plugin name. A failing plugin gets no entry in
    /// [`Collection::items`] and never fails the pass. When failure reporting
    /// is enabled its cause lands in [`Collection::failures`].
    ///
    /// There is no per-plugin timeout: a plugin that never returns keeps the
    /// pass pending. Dropping the returned future cancels the pass's
    /// bookkeeping tasks but not plugin invocations already in flight.
    pub async fn collect_all_metrics(&self) -> Collection {
        run_pass(self.registry.snapshot(), &self.config).await
    }
}

/// Run one collection pass over `registry` with default settings
pub async fn collect_all_metrics(registry: &PluginRegistry) -> Collection {
    run_pass(registry.snapshot(), &CollectionConfig::default()).await
}

async fn run_pass(plugins: Vec<Arc<dyn DataCollector>>, config: &CollectionConfig) -> Collection {
    let count = plugins.len();
    debug!("Starting collection pass over {} plugin(s)", count);

    let cancel = CancellationToken::new();
    let _abandon_guard = cancel.clone().drop_guard();
    let completion = Arc::new(CompletionCounter::new(count));

    let mut channels = Vec::with_capacity(count);
    let mut error_channels = Vec::with_capacity(count);
    for plugin in plugins {
        let (results, errors) = collector_wrapper(&cancel, plugin);
        channels.push(results);
        error_channels.push(errors);
    }

    let mut merged = fanin(completion, channels, cancel.clone(), config.merge_buffer);

    let mut collection = Collection::new();
    while let Some(result) = merged.recv().await {
        collection.insert(result);
    }
    cancel.cancel();

    // Every wrapper has finished by the time the merged channel closes,
    // so each error channel either holds its failure or is closed.
    if config.report_failures {
        for mut errors in error_channels {
            if let Ok(failure) = errors.try_recv() {
                collection.record_failure(failure);
            }
        }
    }

    info!(
        "Collection pass finished: {} of {} plugin(s) succeeded",
        collection.len(),
        count
    );

    collection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{BlockingCollector, FnCollector};
    use rand::Rng;
    use rand::seq::SliceRandom;
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    fn succeeding(name: &str) -> Arc<dyn DataCollector> {
        let value = json!({ "plugin": name });
        Arc::new(FnCollector::new(name, move || {
            let value = value.clone();
            async move {
                let jitter = rand::rng().random_range(0..5);
                sleep(Duration::from_millis(jitter)).await;
                Ok(value)
            }
        }))
    }

    fn failing(name: &str) -> Arc<dyn DataCollector> {
        let reason = format!("{} is unavailable", name);
        Arc::new(FnCollector::new(name, move || {
            let reason = reason.clone();
            async move { Err(anyhow::anyhow!(reason)) }
        }))
    }

    fn boxed<P: DataCollector>(plugin: P) -> Arc<dyn DataCollector> {
        Arc::new(plugin)
    }

    fn registry_of(plugins: Vec<Arc<dyn DataCollector>>) -> Arc<PluginRegistry> {
        let registry = Arc::new(PluginRegistry::new());
        for plugin in plugins {
            registry.register(plugin).unwrap();
        }
        registry
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_all_successful_plugins_are_collected() {
        for n in 0..=8 {
            let plugins = (0..n).map(|i| succeeding(&format!("plugin-{}", i))).collect();
            let detective = Detective::new(registry_of(plugins));

            let collection = detective.collect_all_metrics().await;

            assert_eq!(collection.len(), n);
            assert!(collection.is_complete());
            for i in 0..n {
                let name = format!("plugin-{}", i);
                assert_eq!(collection.get(&name).unwrap().value, json!({ "plugin": name }));
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_only_successful_plugins_populate_items() {
        let n = 6;
        for k in 0..=n {
            let mut outcomes: Vec<bool> = (0..n).map(|i| i >= k).collect();
            outcomes.shuffle(&mut rand::rng());

            let plugins = outcomes
                .iter()
                .enumerate()
                .map(|(i, ok)| {
                    let name = format!("plugin-{}", i);
                    if *ok { succeeding(&name) } else { failing(&name) }
                })
                .collect();
            let detective = Detective::new(registry_of(plugins));

            let collection = detective.collect_all_metrics().await;

            assert_eq!(collection.len(), n - k, "k = {}", k);
            assert_eq!(collection.failures.len(), k, "k = {}", k);
            for (i, ok) in outcomes.iter().enumerate() {
                let name = format!("plugin-{}", i);
                assert_eq!(collection.get(&name).is_some(), *ok);
                assert_eq!(collection.failure(&name).is_some(), !*ok);
            }
        }
    }

    #[tokio::test]
    async fn test_empty_registry_returns_empty_collection() {
        let detective = Detective::new(Arc::new(PluginRegistry::new()));

        let collection = timeout(Duration::from_millis(200), detective.collect_all_metrics())
            .await
            .expect("empty pass should not block");
        assert!(collection.is_empty());
        assert!(collection.is_complete());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_duplicate_names_yield_single_entry() {
        let registry = registry_of(vec![
            boxed(FnCollector::new("cpu", || async { Ok(json!("A")) })),
            boxed(FnCollector::new("cpu", || async { Ok(json!("B")) })),
        ]);

        let collection = Detective::new(registry).collect_all_metrics().await;

        assert_eq!(collection.len(), 1);
        let value = &collection.get("cpu").unwrap().value;
        assert!(*value == json!("A") || *value == json!("B"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_overlapping_passes_are_independent() {
        let shared = registry_of((0..5).map(|i| succeeding(&format!("shared-{}", i))).collect());
        let other = registry_of(vec![succeeding("solo"), failing("broken")]);

        let first = Detective::new(Arc::clone(&shared));
        let second = Detective::new(shared);
        let third = Detective::new(other);

        let (a, b, c) = tokio::join!(
            first.collect_all_metrics(),
            second.collect_all_metrics(),
            third.collect_all_metrics()
        );

        assert_eq!(a.len(), 5);
        assert_eq!(b.len(), 5);
        assert_eq!(a.names(), b.names());
        assert_eq!(c.names(), vec!["solo"]);
        assert!(c.failure("broken").is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_stalled_plugin_blocks_the_pass() {
        let registry = registry_of(vec![
            succeeding("fast"),
            boxed(FnCollector::new("stalled", || async {
                std::future::pending::<()>().await;
                Ok(json!(null))
            })),
        ]);
        let detective = Detective::new(registry);

        let outcome = timeout(Duration::from_millis(200), detective.collect_all_metrics()).await;
        assert!(outcome.is_err(), "pass must not complete while a plugin is stalled");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_panicking_plugin_does_not_abort_pass() {
        async fn explode() -> anyhow::Result<serde_json::Value> {
            panic!("probe exploded")
        }

        let registry = registry_of(vec![
            succeeding("steady"),
            boxed(FnCollector::new("volatile", explode)),
        ]);

        let collection = Detective::new(registry).collect_all_metrics().await;

        assert_eq!(collection.names(), vec!["steady"]);
        let failure = collection.failure("volatile").unwrap();
        assert!(failure.panicked);
        assert_eq!(failure.reason, "probe exploded");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_failure_reporting_can_be_disabled() {
        let registry = registry_of(vec![succeeding("ok"), failing("bad")]);
        let config = crate::collector::CollectionConfigBuilder::new()
            .report_failures(false)
            .build();

        let collection = Detective::with_config(registry, config).collect_all_metrics().await;

        assert_eq!(collection.names(), vec!["ok"]);
        assert!(collection.failures.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_blocking_plugins_run_concurrently() {
        let plugins = (0..4)
            .map(|i| {
                boxed(BlockingCollector::new(format!("blocking-{}", i), || {
                    std::thread::sleep(Duration::from_millis(100));
                    Ok(json!(true))
                }))
            })
            .collect();
        let detective = Detective::new(registry_of(plugins));

        // Sequential execution would need 400ms
        let collection = timeout(Duration::from_millis(350), detective.collect_all_metrics())
            .await
            .expect("blocking plugins should overlap");
        assert_eq!(collection.len(), 4);
    }

    #[tokio::test]
    async fn test_free_function_uses_defaults() {
        let registry = PluginRegistry::new();
        registry.register(succeeding("uptime")).unwrap();
        registry.register(failing("hostname")).unwrap();

        let collection = collect_all_metrics(&registry).await;

        assert_eq!(collection.names(), vec!["uptime"]);
        assert!(collection.failure("hostname").is_some());
    }
}
