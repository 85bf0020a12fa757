//! Intake orchestrator — the entry point for newly selected files.
//!
//! Validates each candidate, registers accepted ones in the progress
//! ledger, and drives exactly the new entries through the batch
//! scheduler. Owns the add/remove lifecycle of ledger entries.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::IntakeConfig;
use crate::ledger::ProgressLedger;
use crate::scheduler::{BatchScheduler, PendingUpload};
use crate::transfer::FileTransfer;
use crate::types::{FileEntry, FilePayload, FileSnapshot, IntakeEvent, PROGRESS_FAILED};
use crate::validation::ValidationError;

/// Event channel capacity.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Orchestrates the intake of user-selected files.
pub struct Orchestrator {
    config: IntakeConfig,
    ledger: Arc<ProgressLedger>,
    transfer: Arc<dyn FileTransfer>,
    events_tx: mpsc::Sender<IntakeEvent>,
    events_rx: Option<mpsc::Receiver<IntakeEvent>>,
    next_seq: AtomicU64,
}

impl Orchestrator {
    /// Creates an orchestrator uploading through `transfer`.
    pub fn new(config: IntakeConfig, transfer: Arc<dyn FileTransfer>) -> Self {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config,
            ledger: Arc::new(ProgressLedger::new()),
            transfer,
            events_tx,
            events_rx: Some(events_rx),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Takes the event receiver. Can only be called once.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<IntakeEvent>> {
        self.events_rx.take()
    }

    /// Submits newly selected files.
    ///
    /// Rejected files are surfaced as [`IntakeEvent::FileRejected`] and
    /// never touch the ledger. Accepted files are appended (existing
    /// entries are kept as they are) and uploaded; the call suspends
    /// until every new entry reaches a terminal state. Returns the ids
    /// of the accepted entries.
    pub async fn submit(&self, files: Vec<FilePayload>) -> Vec<String> {
        let accepted = self.filter_accepted(files).await;
        if accepted.is_empty() {
            return Vec::new();
        }

        let stamp = chrono::Utc::now().timestamp_millis();
        let mut entries = Vec::with_capacity(accepted.len());
        let mut pending = Vec::with_capacity(accepted.len());
        for file in accepted {
            let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
            let id = format!("file{seq}-{stamp}");
            let payload = Arc::new(file);
            entries.push(FileEntry::new(id.as_str(), Arc::clone(&payload)));
            pending.push(PendingUpload { id, payload });
        }
        let ids: Vec<String> = pending.iter().map(|p| p.id.clone()).collect();

        self.ledger.append(entries);
        info!(count = ids.len(), "files accepted for upload");

        let scheduler = BatchScheduler::new(
            Arc::clone(&self.ledger),
            Arc::clone(&self.transfer),
            self.events_tx.clone(),
            self.config.batch_size,
            self.config.transfer_timeout,
        );
        scheduler.run(&pending).await;

        let mut completed = 0;
        let mut failed = 0;
        for id in &ids {
            match self.ledger.get(id).map(|s| s.progress) {
                Some(100) => completed += 1,
                Some(PROGRESS_FAILED) => failed += 1,
                // Removed mid-flight, or still pending after removal.
                _ => {}
            }
        }
        let _ = self
            .events_tx
            .send(IntakeEvent::AllSettled { completed, failed })
            .await;
        ids
    }

    async fn filter_accepted(&self, files: Vec<FilePayload>) -> Vec<FilePayload> {
        let mut remaining = self
            .config
            .max_selected
            .map(|cap| cap.saturating_sub(self.ledger.len()));

        let mut accepted = Vec::with_capacity(files.len());
        for file in files {
            if let Err(reason) = self.config.policy.validate(&file.name, file.size_bytes()) {
                warn!(file = %file.name, reason = %reason, "file rejected");
                let _ = self
                    .events_tx
                    .send(IntakeEvent::FileRejected {
                        name: file.name,
                        reason,
                    })
                    .await;
                continue;
            }
            if let Some(ref mut left) = remaining {
                if *left == 0 {
                    warn!(file = %file.name, "selection limit reached, file rejected");
                    let _ = self
                        .events_tx
                        .send(IntakeEvent::FileRejected {
                            name: file.name,
                            reason: ValidationError::TooManySelected,
                        })
                        .await;
                    continue;
                }
                *left -= 1;
            }
            accepted.push(file);
        }
        accepted
    }

    /// Removes an entry from the ledger. No-op when `id` is unknown.
    pub fn remove(&self, id: &str) {
        if self.ledger.remove(id) {
            info!(id = %id, "entry removed");
        }
    }

    /// Ordered UI-facing view of all entries.
    pub fn snapshot(&self) -> Vec<FileSnapshot> {
        self.ledger.snapshot()
    }

    /// Ordered file names of all entries, for the downstream
    /// conversation-start collaborator.
    pub fn selected_identities(&self) -> Vec<String> {
        self.ledger.selected_identities()
    }

    /// Entries still selectable under the configured cap, if any.
    pub fn remaining_capacity(&self) -> Option<usize> {
        self.config
            .max_selected
            .map(|cap| cap.saturating_sub(self.ledger.len()))
    }

    /// The shared ledger, for callers that poll progress directly.
    pub fn ledger(&self) -> &Arc<ProgressLedger> {
        &self.ledger
    }
}
