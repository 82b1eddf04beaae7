use super::core::{DataCollector, MetricResult, PluginFailure};
use log::{debug, error, trace, warn};
use std::any::Any;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// Run one plugin in its own task
///
/// Returns a result channel that yields at most one [`MetricResult`] and an
/// error channel that yields at most one [`PluginFailure`]; exactly one of
/// them carries a value unless the pass is cancelled first. Both close once
/// the wrapper is finished with the plugin.
///
/// Cancellation is advisory: it releases the wrapper's bookkeeping task but
/// never aborts the plugin invocation itself, which runs to completion on its
/// own task and has its output discarded.
pub fn collector_wrapper(
    cancel: &CancellationToken,
    plugin: Arc<dyn DataCollector>,
) -> (mpsc::Receiver<MetricResult>, oneshot::Receiver<PluginFailure>) {
    let (result_tx, result_rx) = mpsc::channel(1);
    let (error_tx, error_rx) = oneshot::channel();

    let name = plugin.name().to_string();
    let cancel = cancel.clone();

    let invocation = tokio::spawn(async move {
        let started = Instant::now();
        let outcome = plugin.collect().await;
        (outcome, started.elapsed())
    });

    tokio::spawn(async move {
        let joined = tokio::select! {
            biased;
            joined = invocation => joined,
            _ = cancel.cancelled() => {
                debug!("Collection cancelled before plugin '{}' returned", name);
                return;
            }
        };

        match joined {
            Ok((Ok(value), elapsed)) => {
                trace!("Plugin '{}' returned after {:?}", name, elapsed);
                let result = MetricResult::new(name, value, elapsed.as_millis() as u64);
                // Capacity is one and this is the only send
                if result_tx.send(result).await.is_err() {
                    trace!("Result receiver dropped before delivery");
                }
            }
            Ok((Err(err), _)) => {
                warn!("Plugin '{}' failed: {:#}", name, err);
                let _ = error_tx.send(PluginFailure::failed(name, &err));
            }
            Err(join_err) if join_err.is_panic() => {
                let message = panic_message(join_err.into_panic());
                error!("Plugin '{}' panicked: {}", name, message);
                let _ = error_tx.send(PluginFailure::panicked(name, message));
            }
            Err(join_err) => {
                error!("Plugin '{}' task did not complete: {}", name, join_err);
                let _ = error_tx.send(PluginFailure::panicked(name, join_err.to_string()));
            }
        }
    });

    (result_rx, error_rx)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "plugin panicked".to_string()
    }
}
