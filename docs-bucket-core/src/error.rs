//! Error type shared by the clients and pipelines.
//!
//! Every variant names the operation it came from (`documents.list`,
//! `knowledge.file.add`, ...) so that a per-item failure recorded in a report
//! still says which call went wrong.

use std::path::PathBuf;

pub use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// DNS, connect, or body-read failure. Never retried.
    #[error("{operation}: transport error: {source}")]
    Transport {
        operation: &'static str,
        source: reqwest::Error,
    },

    /// Any status other than the accepted ones (429 is handled before this).
    #[error("{operation}: unexpected status {status}: {body}")]
    Status {
        operation: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("{operation}: failed to decode response: {source}")]
    Decode {
        operation: &'static str,
        source: serde_json::Error,
    },

    #[error("{operation}: file id not found in response")]
    MissingFileId { operation: &'static str },

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;

impl SyncError {
    pub fn transport(operation: &'static str, source: reqwest::Error) -> Self {
        Self::Transport { operation, source }
    }

    pub fn status(operation: &'static str, status: StatusCode, body: impl Into<String>) -> Self {
        Self::Status {
            operation,
            status,
            body: body.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
