//! Error types shared by every store backend and the facade.
//!
//! One public enum crosses the API boundary. Internal helpers may work with
//! `std::io::Error` or `serde_json::Error` locally, but they are normalized
//! into `StoreError` before any caller sees them.

use std::io;
use std::path::PathBuf;

/// Errors surfaced by store operations.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// No record exists under the requested id.
    #[error("no record found for id '{id}'")]
    NotFound { id: String },

    /// An I/O failure while persisting, loading, or removing records.
    #[error("persistence failure at '{}': {}", .path.display(), .source)]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A value could not be encoded, or a persisted document could not be
    /// decoded.
    #[error("serialization failure: {message}")]
    Serialization { message: String },

    /// The store could not be constructed: the backing directory cannot be
    /// created, the configuration is contradictory, or a single-file
    /// aggregate is corrupt.
    #[error("store initialization failed: {message}")]
    Initialization { message: String },
}

impl StoreError {
    /// True for the "record does not exist" case, the one callers most
    /// often branch on.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization {
            message: e.to_string(),
        }
    }
}
