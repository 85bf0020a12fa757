//! Intake error types.

use std::time::Duration;

/// Errors produced by one transfer attempt.
///
/// A transfer failure is isolated to its entry: the scheduler marks the
/// entry failed and continues with its siblings and later batches.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("upload failed: {0}")]
    Failed(String),

    #[error("upload timed out after {0:?}")]
    TimedOut(Duration),
}
