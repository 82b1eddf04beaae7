//! Fan-in of per-plugin result channels into one merged stream.

use log::trace;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::collector::MetricResult;
use crate::sync::CompletionCounter;

/// Merge many result channels into one
///
/// One forwarding task per input copies results onto the shared output until
/// its input closes, then releases its output handle and marks one unit of
/// `completion` done. A separate closer task waits for `completion` to reach
/// zero and releases the final output handle, which closes the merged
/// channel. `completion` must be sized to `inputs.len()`.
///
/// Forwarders also stop when `cancel` fires, so an abandoned pass does not
/// leave them parked on a channel nobody reads. No ordering is imposed
/// between results from different inputs.
pub fn fanin(
    completion: Arc<CompletionCounter>,
    inputs: Vec<mpsc::Receiver<MetricResult>>,
    cancel: CancellationToken,
    buffer: usize,
) -> mpsc::Receiver<MetricResult> {
    let (out_tx, out_rx) = mpsc::channel(buffer.max(1));

    for input in inputs {
        let out_tx = out_tx.clone();
        let completion = Arc::clone(&completion);
        let cancel = cancel.clone();

        tokio::spawn(async move {
            forward(input, &out_tx, &cancel).await;
            drop(out_tx);
            completion.done();
        });
    }

    tokio::spawn(async move {
        completion.wait().await;
        trace!("All forwarders finished, closing merged channel");
        drop(out_tx);
    });

    out_rx
}

async fn forward(
    mut input: mpsc::Receiver<MetricResult>,
    out: &mpsc::Sender<MetricResult>,
    cancel: &CancellationToken,
) {
    loop {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            received = input.recv() => match received {
                Some(result) => result,
                None => return,
            },
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            sent = out.send(result) => {
                if sent.is_err() {
                    trace!("Merged receiver dropped, forwarder exiting");
                    return;
                }
            }
        }
    }
}
