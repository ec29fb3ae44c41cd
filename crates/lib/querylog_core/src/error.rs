//! Pipeline error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::alert::NotifyError;
use crate::router::Stream;

pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised while capturing and routing a single query.
///
/// `MalformedQueryEvent` and `DirectoryCreationFailed` abort the invocation
/// before anything is written. `FileWriteFailed` and `NotificationFailed`
/// are collected as warnings on an otherwise successful save.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Malformed query event: {0}")]
    MalformedQueryEvent(String),

    #[error("Failed to create log directory {}: {source}", .path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {stream} log {}: {source}", .path.display())]
    FileWriteFailed {
        stream: Stream,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Alert notification failed: {0}")]
    NotificationFailed(#[from] NotifyError),
}

impl Error {
    /// Whether this error aborts the invocation rather than being reported
    /// alongside a successful save.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::MalformedQueryEvent(_) | Error::DirectoryCreationFailed { .. }
        )
    }
}
