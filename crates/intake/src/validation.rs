//! File validation against the intake policy.
//!
//! Pure accept/reject decisions — no I/O, and never touches the ledger.
//! Rejections are surfaced to the user by the orchestrator.

use serde::{Deserialize, Serialize};

/// Default maximum accepted file size: 15 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 15 * 1024 * 1024;

/// Reasons a selected file is refused at submission time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("file type not supported")]
    UnsupportedType,

    #[error("file too large, maximum is {0} bytes")]
    TooLarge(u64),

    /// Selection cap reached. Produced by the orchestrator when a
    /// `max_selected` limit is configured, never by the policy itself.
    #[error("selection limit reached")]
    TooManySelected,
}

/// Immutable accept/reject policy for selected files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    /// Allowed extensions, each with its leading dot. Case-sensitive.
    pub allowed_extensions: Vec<String>,
    /// Maximum accepted size in bytes.
    pub max_file_size: u64,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            allowed_extensions: vec![".pdf".into()],
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl ValidationPolicy {
    /// Checks a candidate file's name and size against the policy.
    ///
    /// Type is checked before size; when both fail only the type reason
    /// is reported.
    pub fn validate(&self, name: &str, size: u64) -> Result<(), ValidationError> {
        let ext = extension_of(name);
        if !self.allowed_extensions.iter().any(|allowed| *allowed == ext) {
            return Err(ValidationError::UnsupportedType);
        }
        if size > self.max_file_size {
            return Err(ValidationError::TooLarge(self.max_file_size));
        }
        Ok(())
    }
}

/// Case-sensitive extension including the leading dot; empty when the
/// name has no dot.
pub(crate) fn extension_of(name: &str) -> String {
    match name.rfind('.') {
        Some(idx) => name[idx..].to_string(),
        None => String::new(),
    }
}
