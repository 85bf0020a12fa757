//! REST client for the docsight conversation backend.
//!
//! Wraps the backend's upload, conversation, and document endpoints, and
//! adapts the upload endpoint to the intake engine's [`FileTransfer`]
//! seam so the orchestrator can drive real network transfers.
//!
//! [`FileTransfer`]: docsight_intake::FileTransfer

pub mod client;
mod transfer;

pub use client::{Client, Error};
