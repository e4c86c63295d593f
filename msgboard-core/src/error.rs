//! Structured error types for msgboard-core.
//!
//! Store calls return these so the board state machine can log a precise
//! reason before swallowing the failure. The binary uses `anyhow` on top.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::MessageId;

/// Main error type for message board operations
#[derive(Error, Debug)]
pub enum BoardError {
    /// Transport-level failure (connect, TLS, body read)
    #[error("{operation} request failed: {source}")]
    Http {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Store answered with a non-success status
    #[error("{operation} returned {status}: {message}")]
    Status {
        operation: &'static str,
        status: u16,
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("{operation} returned a malformed body: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Reading a local media file failed
    #[error("Failed to read media file {path:?}: {source}")]
    Media {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Another request for this message is still pending
    #[error("Message {id} already has a request in flight")]
    Busy { id: MessageId },

    /// A message is already being submitted
    #[error("A message is already being submitted")]
    SubmitInProgress,

    /// A board action reached the store and the store refused or failed it
    #[error("{operation} failed: {reason}")]
    Failed {
        operation: &'static str,
        reason: String,
    },
}

/// Result type alias for board operations
pub type Result<T> = std::result::Result<T, BoardError>;

impl BoardError {
    /// Create a transport error for an operation
    pub fn http(operation: &'static str, source: reqwest::Error) -> Self {
        Self::Http { operation, source }
    }

    /// Create a status error for an operation
    pub fn status(operation: &'static str, status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            operation,
            status,
            message: message.into(),
        }
    }

    /// Create a decode error for an operation
    pub fn decode(operation: &'static str, source: serde_json::Error) -> Self {
        Self::Decode { operation, source }
    }

    /// Create a media read error
    pub fn media(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Media {
            path: path.into(),
            source,
        }
    }

    /// Create a busy error
    pub fn busy(id: &MessageId) -> Self {
        Self::Busy { id: id.clone() }
    }

    /// Summarize a store failure that the board already logged and absorbed
    pub fn failed(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Failed {
            operation,
            reason: reason.into(),
        }
    }

    /// Guard rejections are not store failures
    pub fn is_guard(&self) -> bool {
        matches!(self, Self::Busy { .. } | Self::SubmitInProgress)
    }
}
