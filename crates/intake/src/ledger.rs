//! Progress ledger — the authoritative ordered collection of intake
//! entries (thread-safe).
//!
//! Every progress write is keyed by entry id and serialized by the
//! interior lock, so concurrent transfer callbacks within a batch cannot
//! lose or interleave updates. Entries are only ever removed by an
//! explicit caller request — the ledger never auto-evicts.

use std::sync::RwLock;

use crate::types::{FileEntry, FileSnapshot, TransferState};

/// Ordered, keyed collection of file entries.
#[derive(Default)]
pub struct ProgressLedger {
    inner: RwLock<Vec<FileEntry>>,
}

impl ProgressLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends new entries, preserving the order of existing ones.
    pub fn append(&self, entries: Vec<FileEntry>) {
        let mut inner = self.inner.write().unwrap();
        inner.extend(entries);
    }

    /// Applies a keyed state update. No-op when `id` is absent.
    ///
    /// Enforces the progress invariant: terminal entries never change,
    /// in-flight percent never decreases, and the failure transition is
    /// legal from any non-terminal state.
    pub fn update(&self, id: &str, state: TransferState) {
        let mut inner = self.inner.write().unwrap();
        let Some(entry) = inner.iter_mut().find(|e| e.id == id) else {
            return;
        };
        entry.state = match (entry.state, state) {
            (current, _) if current.is_terminal() => return,
            (_, TransferState::Failed) => TransferState::Failed,
            (TransferState::InFlight(_), TransferState::Queued) => return,
            (TransferState::InFlight(current), TransferState::InFlight(next))
                if next < current =>
            {
                return;
            }
            (_, next) => next,
        };
    }

    /// Removes the entry with `id`. Returns `false` when absent.
    pub fn remove(&self, id: &str) -> bool {
        let mut inner = self.inner.write().unwrap();
        let before = inner.len();
        inner.retain(|e| e.id != id);
        inner.len() != before
    }

    /// Ordered snapshot of all entries, reflecting the most recently
    /// applied update.
    pub fn snapshot(&self) -> Vec<FileSnapshot> {
        let inner = self.inner.read().unwrap();
        inner.iter().map(snapshot_of).collect()
    }

    /// Snapshot of a single entry.
    pub fn get(&self, id: &str) -> Option<FileSnapshot> {
        let inner = self.inner.read().unwrap();
        inner.iter().find(|e| e.id == id).map(snapshot_of)
    }

    /// Ordered underlying file names of all entries.
    pub fn selected_identities(&self) -> Vec<String> {
        let inner = self.inner.read().unwrap();
        inner.iter().map(|e| e.payload.name.clone()).collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    /// Returns `true` when the ledger holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().is_empty()
    }
}

fn snapshot_of(entry: &FileEntry) -> FileSnapshot {
    FileSnapshot {
        id: entry.id.clone(),
        display_name: entry.payload.name.clone(),
        size_bytes: entry.payload.size_bytes(),
        progress: entry.state.progress(),
    }
}
