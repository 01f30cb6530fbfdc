//! Database Error Types
//!
//! Errors raised by `NodeStore` backends: file access, document
//! (de)serialization and record-level conflicts. Business-rule failures
//! belong to the service layer.

use std::path::PathBuf;
use thiserror::Error;

/// Persistence operation errors
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Reading or writing the backing file failed
    #[error("I/O failure on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The document could not be encoded or decoded
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The document parsed as JSON but does not have the expected shape
    #[error("Malformed document at {path}: {reason}")]
    MalformedDocument { path: PathBuf, reason: String },

    /// A record with this ID is already stored
    #[error("Node already exists: {id}")]
    DuplicateId { id: String },

    /// The record targeted by a write is not stored
    #[error("Node not found in store: {id}")]
    RecordNotFound { id: String },
}

impl DatabaseError {
    /// Create an I/O error bound to the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a malformed document error
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a duplicate ID error
    pub fn duplicate_id(id: impl Into<String>) -> Self {
        Self::DuplicateId { id: id.into() }
    }

    /// Create a record not found error
    pub fn record_not_found(id: impl Into<String>) -> Self {
        Self::RecordNotFound { id: id.into() }
    }
}
