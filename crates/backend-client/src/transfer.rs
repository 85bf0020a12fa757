//! Adapter: the backend upload endpoint as the intake transfer primitive.

use std::sync::Arc;

use docsight_intake::{FilePayload, FileTransfer, ProgressFn, TransferError, TransferFuture};

use crate::client::Client;

impl FileTransfer for Client {
    fn upload(&self, payload: Arc<FilePayload>, progress: ProgressFn) -> TransferFuture<'_> {
        Box::pin(async move {
            self.upload_document(&payload.name, payload.data.clone(), progress)
                .await
                .map_err(|e| TransferError::Failed(e.to_string()))
        })
    }
}
