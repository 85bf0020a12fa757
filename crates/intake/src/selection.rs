//! Selection pump — bridges an input-event subscription (file picker,
//! drag-and-drop) to the orchestrator.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::orchestrator::Orchestrator;
use crate::types::FilePayload;

/// Forwards each received selection to [`Orchestrator::submit`].
///
/// Runs until `cancel` fires or the sender side is dropped; both paths
/// release the subscription, so the pump's lifetime is scoped to its
/// owner. Selections arriving while an upload is in progress queue in
/// the channel and are submitted in order.
pub async fn run_selection_pump(
    mut selections: mpsc::Receiver<Vec<FilePayload>>,
    orchestrator: Arc<Orchestrator>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("selection pump cancelled");
                break;
            }
            selection = selections.recv() => {
                match selection {
                    Some(files) => {
                        debug!(count = files.len(), "selection received");
                        orchestrator.submit(files).await;
                    }
                    None => {
                        debug!("selection channel closed");
                        break;
                    }
                }
            }
        }
    }
}
