//! Typed errors for remote sync operations
//!
//! # Error Categories
//!
//! - [`SyncError`]: what a [`RemoteSyncStore`](crate::core::store::RemoteSyncStore)
//!   call reports to its caller
//! - [`TransportError`]: what a [`RemoteTransport`](crate::core::transport::RemoteTransport)
//!   reports when a request never produced a response
//!
//! Malformed record fields are not errors; normalization degrades them to
//! defaults instead.
//!
//! # Example
//!
//! ```rust,ignore
//! match store.create(patch).await {
//!     Ok(record) => println!("created {:?}", record.id),
//!     Err(SyncError::CreateFailed(message)) => keep_modal_open(&message),
//!     Err(e) => eprintln!("other error: {}", e),
//! }
//! ```

use serde_json::Value;
use thiserror::Error;

/// Result type for store operations.
pub type SyncResult<T> = Result<T, SyncError>;

// =============================================================================
// Sync Errors
// =============================================================================

/// Errors surfaced by the sync store
///
/// The mutation variants display as the bare server-provided message so the
/// UI can show it verbatim.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    /// Network or parse failure before a response was available
    #[error("transport error: {0}")]
    Transport(String),

    /// Create request answered with a non-success status
    #[error("{0}")]
    CreateFailed(String),

    /// Update request answered with a non-success status
    #[error("{0}")]
    UpdateFailed(String),

    /// Delete request answered with a non-success status
    #[error("{0}")]
    DeleteFailed(String),
}

impl SyncError {
    /// The human-readable message carried by this error
    pub fn message(&self) -> &str {
        match self {
            SyncError::Transport(m)
            | SyncError::CreateFailed(m)
            | SyncError::UpdateFailed(m)
            | SyncError::DeleteFailed(m) => m,
        }
    }

    /// True for failures that happened before the server answered
    pub fn is_transport(&self) -> bool {
        matches!(self, SyncError::Transport(_))
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            SyncError::Transport(_) => "TRANSPORT_ERROR",
            SyncError::CreateFailed(_) => "CREATE_FAILED",
            SyncError::UpdateFailed(_) => "UPDATE_FAILED",
            SyncError::DeleteFailed(_) => "DELETE_FAILED",
        }
    }
}

impl From<TransportError> for SyncError {
    fn from(err: TransportError) -> Self {
        SyncError::Transport(err.message)
    }
}

// =============================================================================
// Transport Errors
// =============================================================================

/// A request that did not produce an HTTP response
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// Failure messages
// =============================================================================

/// Extract a human-readable message from a failed response body
///
/// A JSON object with a non-empty `message` wins; any other JSON body is
/// reported as its JSON text; plain text is reported as-is; an empty body
/// falls back to `fallback`.
pub fn failure_message(body: &str, fallback: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return fallback.to_string();
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(obj)) => match obj.get("message").cloned() {
            Some(Value::String(m)) if !m.is_empty() => m,
            Some(Value::Null) | Some(Value::String(_)) | None => {
                Value::Object(obj).to_string()
            }
            Some(other) => other.to_string(),
        },
        Ok(Value::String(s)) if !s.is_empty() => s,
        Ok(Value::Null) | Ok(Value::String(_)) => fallback.to_string(),
        Ok(other) => other.to_string(),
        Err(_) => trimmed.to_string(),
    }
}
