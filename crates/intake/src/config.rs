//! Intake configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::validation::ValidationPolicy;

/// Default number of concurrent uploads per batch.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Tunable intake settings. `Default` carries the production values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Concurrency cap: files per upload group.
    pub batch_size: usize,
    /// Accept/reject policy for newly selected files.
    pub policy: ValidationPolicy,
    /// Optional cap on total ledger entries. `None` leaves enforcement
    /// to the embedding UI.
    pub max_selected: Option<usize>,
    /// Per-transfer deadline. `None` waits indefinitely — a transfer
    /// that never resolves blocks its batch. `Some` fails the entry
    /// once the deadline passes and lets the batch proceed.
    pub transfer_timeout: Option<Duration>,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            policy: ValidationPolicy::default(),
            max_selected: None,
            transfer_timeout: None,
        }
    }
}
