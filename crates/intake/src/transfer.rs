//! Transfer primitive seam.
//!
//! The intake engine treats the actual network upload as a black box
//! behind [`FileTransfer`]. The backend-client crate implements it for
//! the production REST backend; tests implement it with scripted mocks.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use docsight_protocol::UploadResponse;

use crate::error::TransferError;
use crate::types::FilePayload;

/// Progress callback invoked with `(bytes_loaded, bytes_total)`.
///
/// Called zero or more times with non-decreasing `bytes_loaded` before
/// the transfer resolves.
pub type ProgressFn = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Boxed future returned by [`FileTransfer`] implementations.
pub type TransferFuture<'a> =
    Pin<Box<dyn Future<Output = Result<UploadResponse, TransferError>> + Send + 'a>>;

/// Uploads one file to the remote endpoint.
///
/// Implementations must support concurrent invocation — the scheduler
/// dispatches every member of a batch at once.
pub trait FileTransfer: Send + Sync {
    /// Performs one upload, reporting progress through `progress`, and
    /// resolves on completion or failure.
    fn upload(&self, payload: Arc<FilePayload>, progress: ProgressFn) -> TransferFuture<'_>;
}
