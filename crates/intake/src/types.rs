//! Data types for the intake pipeline.

use std::sync::Arc;

use serde::Serialize;

use crate::validation::{ValidationError, extension_of};

/// Progress encoding of a queued entry (accepted, not yet started).
pub const PROGRESS_QUEUED: i32 = -1;

/// Progress encoding of a failed entry.
pub const PROGRESS_FAILED: i32 = -2;

/// Opaque handle to one selected file's bytes and metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub name: String,
    pub data: Vec<u8>,
}

impl FilePayload {
    /// Creates a payload from a file name and its raw bytes.
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// File size in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }

    /// Case-sensitive extension including the leading dot.
    ///
    /// Empty when the name contains no dot.
    pub fn extension(&self) -> String {
        extension_of(&self.name)
    }
}

/// Transfer state of one ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    /// Accepted, waiting for its batch to start.
    Queued,
    /// Upload in flight at the given percent.
    InFlight(u8),
    /// Upload finished successfully.
    Completed,
    /// Upload failed. Stays failed until the entry is removed or the
    /// file is resubmitted as a new entry.
    Failed,
}

impl TransferState {
    /// Integer encoding consumed by the UI: `-1` queued, `0..=99`
    /// in-flight percent, `100` completed, `-2` failed.
    pub fn progress(&self) -> i32 {
        match self {
            TransferState::Queued => PROGRESS_QUEUED,
            TransferState::InFlight(percent) => i32::from(*percent),
            TransferState::Completed => 100,
            TransferState::Failed => PROGRESS_FAILED,
        }
    }

    /// Returns `true` for `Completed` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferState::Completed | TransferState::Failed)
    }
}

/// One user-submitted file across its whole intake lifecycle.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Unique for the session: submission sequence plus timestamp.
    pub id: String,
    pub payload: Arc<FilePayload>,
    pub state: TransferState,
}

impl FileEntry {
    /// Creates a queued entry for an accepted file.
    pub fn new(id: impl Into<String>, payload: Arc<FilePayload>) -> Self {
        Self {
            id: id.into(),
            payload,
            state: TransferState::Queued,
        }
    }
}

/// Read-only projection of a ledger entry for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSnapshot {
    pub id: String,
    pub display_name: String,
    pub size_bytes: u64,
    /// See [`TransferState::progress`] for the encoding.
    pub progress: i32,
}

impl FileSnapshot {
    /// Human-readable size: `x.xxKB` below 10 KiB, `x.xxMB` otherwise.
    pub fn display_size(&self) -> String {
        let kib = self.size_bytes as f64 / 1024.0;
        if kib < 10.0 {
            format!("{kib:.2}KB")
        } else {
            format!("{:.2}MB", kib / 1024.0)
        }
    }
}

/// Progress and lifecycle notifications emitted by the intake pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeEvent {
    /// A selected file was refused at validation time. The ledger is
    /// untouched.
    FileRejected {
        name: String,
        reason: ValidationError,
    },
    /// A group of uploads started.
    BatchStarted { index: usize, count: usize },
    /// An in-flight upload advanced to `percent`.
    FileProgress { id: String, percent: u8 },
    /// An upload finished successfully.
    FileCompleted { id: String },
    /// An upload failed. The entry stays failed until removed.
    FileFailed { id: String, error: String },
    /// Every entry of one submission reached a terminal state.
    AllSettled { completed: usize, failed: usize },
}
