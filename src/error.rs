//! Error types for presence ingestion, directory lookup and cached snapshots

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by the presence analyzer core
///
/// Malformed individual CSV rows never show up here; the record parser logs
/// and skips them. Everything below is fatal for the call that produced it.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Presence source unavailable: {path}: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read presence records: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid user directory: {0}")]
    Directory(String),

    #[error("Malformed user directory XML: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("User {0} not found")]
    UserNotFound(i64),

    #[error("Rebuild of cached '{key}' failed: {source}")]
    Refresh {
        key: &'static str,
        #[source]
        source: Arc<Error>,
    },
}

/// Result type for presence analyzer operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the error means the requested user is absent (404-class)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::UserNotFound(_))
    }

    /// The underlying error, looking through cache refresh wrappers
    pub fn root(&self) -> &Error {
        match self {
            Error::Refresh { source, .. } => source.root(),
            other => other,
        }
    }
}
