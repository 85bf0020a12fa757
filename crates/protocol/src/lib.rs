//! Wire types for the docsight conversation backend.
//!
//! The backend exposes a small REST surface: document upload, conversation
//! creation, and document listing. These types mirror its JSON payloads
//! exactly (snake_case field names).

pub mod types;

pub use types::{
    CreateConversationRequest, CreateConversationResponse, FileMeta, UploadResponse,
};
