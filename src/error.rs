//! Error taxonomy for the bridge.
//!
//! Every fault raised on the privileged side is converted into one of these
//! values before it crosses the boundary, so they are all serializable and
//! cheap to clone.

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced to callers of the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum BridgeError {
    /// The name is not on the allow-list or not bound in the registry.
    #[error("Unknown capability: {0}")]
    UnknownCapability(String),

    /// A capability with this name was already registered.
    #[error("Duplicate capability: {0}")]
    DuplicateCapability(String),

    /// A native dialog could not be shown.
    #[error(transparent)]
    Dialog(#[from] DialogError),

    /// The underlying filesystem operation failed.
    #[error(transparent)]
    Fs(#[from] FsError),

    /// The handler rejected the shape of its argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The handler panicked while serving the call.
    #[error("Handler failed: {0}")]
    Handler(String),

    /// A reply arrived but did not have the shape the caller expects.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The privileged process cannot be reached (e.g. during teardown).
    #[error("Bridge unavailable: {0}")]
    BridgeUnavailable(String),
}

/// Errors from the dialog orchestrator and its backends.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum DialogError {
    /// The dialog request is malformed.
    #[error("Invalid dialog configuration: {0}")]
    InvalidConfig(String),

    /// No native dialog facility is available in this process.
    #[error("Dialog backend unavailable: {0}")]
    Unavailable(String),

    /// The backend started but could not complete.
    #[error("Dialog failed: {0}")]
    Failed(String),
}

/// Errors from the filesystem access gate.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FsError {
    #[error("No such file or directory: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Relative path, `..` traversal, or outside the allowed roots.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("IO error on {path}: {message}")]
    Io { path: String, message: String },
}

impl FsError {
    /// Classify an `io::Error` raised while operating on `path`.
    pub fn from_io(path: &Path, err: &io::Error) -> Self {
        let shown = path.display().to_string();
        match err.kind() {
            io::ErrorKind::NotFound => FsError::NotFound(shown),
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied(shown),
            _ => FsError::Io {
                path: shown,
                message: err.to_string(),
            },
        }
    }
}

/// Convenience alias used throughout the crate.
pub type BridgeResult<T> = Result<T, BridgeError>;
