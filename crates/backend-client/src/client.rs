//! Async client for the conversation backend REST API.

use docsight_intake::ProgressFn;
use docsight_protocol::{
    CreateConversationRequest, CreateConversationResponse, UploadResponse,
};
use futures_util::stream;
use tracing::{debug, error, info};

/// Upload body chunk size: 64 KiB.
///
/// Small enough that the progress callback sees useful intermediate
/// values for multi-megabyte documents.
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Errors produced by the backend client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Client for the conversation backend.
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Creates a client for the backend at `base_url`.
    ///
    /// A trailing slash on `base_url` is optional.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(reqwest::Client::new(), base_url)
    }

    /// Creates a client reusing an existing `reqwest::Client`.
    pub fn with_http_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self { http, base_url }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Uploads one document as `multipart/form-data` (field `file`).
    ///
    /// The body is streamed in fixed-size chunks so `progress` observes
    /// `(bytes_sent, total)` as the upload advances. A non-2xx status is
    /// an error.
    pub async fn upload_document(
        &self,
        name: &str,
        data: Vec<u8>,
        progress: ProgressFn,
    ) -> Result<UploadResponse, Error> {
        let total = data.len() as u64;
        debug!(file = %name, size = total, "uploading document");

        let chunks: Vec<Vec<u8>> = data.chunks(UPLOAD_CHUNK_SIZE).map(<[u8]>::to_vec).collect();
        let mut sent: u64 = 0;
        let body = reqwest::Body::wrap_stream(stream::iter(chunks.into_iter().map(
            move |chunk| {
                sent += chunk.len() as u64;
                progress(sent, total);
                Ok::<Vec<u8>, std::io::Error>(chunk)
            },
        )));

        let part = reqwest::multipart::Part::stream_with_length(body, total)
            .file_name(name.to_string())
            .mime_str(mime_for(name))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let resp = self
            .http
            .post(self.endpoint("api/upload"))
            .multipart(form)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Error::Status(resp.status()));
        }
        let parsed = resp.json::<UploadResponse>().await?;
        info!(file = %name, "document uploaded");
        Ok(parsed)
    }

    /// Creates a conversation over the given document identities and
    /// returns its id.
    ///
    /// Failures are logged and returned — the caller surfaces a notice
    /// and may retry; nothing else in the pipeline is affected.
    pub async fn create_conversation(&self, document_ids: Vec<String>) -> Result<String, Error> {
        let request = CreateConversationRequest { document_ids };
        let result: Result<String, Error> = async {
            let resp = self
                .http
                .post(self.endpoint("api/conversation/"))
                .json(&request)
                .send()
                .await?;
            if !resp.status().is_success() {
                return Err(Error::Status(resp.status()));
            }
            let parsed = resp.json::<CreateConversationResponse>().await?;
            Ok(parsed.id)
        }
        .await;

        match &result {
            Ok(id) => {
                info!(conversation = %id, documents = request.document_ids.len(), "conversation created");
            }
            Err(e) => error!(error = %e, "conversation creation failed"),
        }
        result
    }

    /// Lists the names of all stored documents.
    pub async fn fetch_documents(&self) -> Result<Vec<String>, Error> {
        let resp = self.http.get(self.endpoint("api/document/")).send().await?;
        if !resp.status().is_success() {
            return Err(Error::Status(resp.status()));
        }
        Ok(resp.json::<Vec<String>>().await?)
    }

    /// Returns the download URL for a stored document.
    pub fn document_url(&self, name: &str) -> String {
        self.endpoint(&format!("api/download/{name}"))
    }
}

fn mime_for(name: &str) -> &'static str {
    if name.ends_with(".pdf") {
        "application/pdf"
    } else {
        "application/octet-stream"
    }
}
