//! Batch scheduler — drives accepted entries through the transfer
//! primitive in fixed-size groups.
//!
//! Groups run strictly one after another, which caps the number of
//! concurrent network transfers at the batch size while still pipelining
//! large selections. Files within a group upload concurrently; the group
//! waits for every member regardless of individual outcomes.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::error::TransferError;
use crate::ledger::ProgressLedger;
use crate::transfer::{FileTransfer, ProgressFn};
use crate::types::{FilePayload, IntakeEvent, TransferState};

/// One entry handed to the scheduler: ledger key plus payload reference.
#[derive(Clone)]
pub struct PendingUpload {
    pub id: String,
    pub payload: Arc<FilePayload>,
}

/// Drives pending uploads to terminal state.
pub struct BatchScheduler {
    ledger: Arc<ProgressLedger>,
    transfer: Arc<dyn FileTransfer>,
    events_tx: mpsc::Sender<IntakeEvent>,
    batch_size: usize,
    transfer_timeout: Option<Duration>,
}

impl BatchScheduler {
    /// Creates a scheduler writing progress to `ledger` and notices to
    /// `events_tx`.
    pub fn new(
        ledger: Arc<ProgressLedger>,
        transfer: Arc<dyn FileTransfer>,
        events_tx: mpsc::Sender<IntakeEvent>,
        batch_size: usize,
        transfer_timeout: Option<Duration>,
    ) -> Self {
        Self {
            ledger,
            transfer,
            events_tx,
            batch_size: batch_size.max(1),
            transfer_timeout,
        }
    }

    /// Uploads every entry in `pending`, suspending until all of them
    /// reach a terminal state.
    ///
    /// Group `k + 1` does not start before every transfer in group `k`
    /// has resolved. A failed transfer never aborts its siblings or
    /// later groups.
    pub async fn run(&self, pending: &[PendingUpload]) {
        for (index, group) in pending.chunks(self.batch_size).enumerate() {
            // (Re)initialize every member before the group starts.
            for item in group {
                self.ledger.update(&item.id, TransferState::InFlight(0));
            }
            let _ = self
                .events_tx
                .send(IntakeEvent::BatchStarted {
                    index,
                    count: group.len(),
                })
                .await;
            debug!(batch = index, files = group.len(), "batch started");

            join_all(group.iter().map(|item| self.upload_one(item))).await;
            debug!(batch = index, "batch settled");
        }
    }

    async fn upload_one(&self, item: &PendingUpload) {
        let progress: ProgressFn = {
            let ledger = Arc::clone(&self.ledger);
            let events_tx = self.events_tx.clone();
            let id = item.id.clone();
            Arc::new(move |loaded, total| {
                let percent = percent_of(loaded, total);
                ledger.update(&id, TransferState::InFlight(percent));
                // Non-blocking: a full event channel never stalls a transfer.
                let _ = events_tx.try_send(IntakeEvent::FileProgress {
                    id: id.clone(),
                    percent,
                });
            })
        };

        let attempt = self.transfer.upload(Arc::clone(&item.payload), progress);
        let result = match self.transfer_timeout {
            Some(limit) => match tokio::time::timeout(limit, attempt).await {
                Ok(result) => result,
                Err(_) => Err(TransferError::TimedOut(limit)),
            },
            None => attempt.await,
        };

        match result {
            Ok(_) => {
                self.ledger.update(&item.id, TransferState::Completed);
                info!(id = %item.id, file = %item.payload.name, "upload completed");
                let _ = self
                    .events_tx
                    .send(IntakeEvent::FileCompleted {
                        id: item.id.clone(),
                    })
                    .await;
            }
            Err(e) => {
                self.ledger.update(&item.id, TransferState::Failed);
                error!(id = %item.id, file = %item.payload.name, error = %e, "upload failed");
                let _ = self
                    .events_tx
                    .send(IntakeEvent::FileFailed {
                        id: item.id.clone(),
                        error: e.to_string(),
                    })
                    .await;
            }
        }
    }
}

/// `floor(loaded / total * 100)`, clamped to 100. Zero when `total` is 0.
fn percent_of(loaded: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    (loaded.saturating_mul(100) / total).min(100) as u8
}
