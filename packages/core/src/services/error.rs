//! Service Layer Error Types
//!
//! This module defines error types for service-layer operations, providing
//! detailed error handling for business rule failures.

use crate::db::DatabaseError;
use crate::models::ValidationError;
use thiserror::Error;

/// Service operation errors
///
/// Hierarchy writes fail with one of four caller-facing kinds: `NodeNotFound`,
/// `ValidationFailed`, `CycleDetected` or `SelfParent`. The remaining
/// variants cover delete policies, malformed requests and storage failures.
#[derive(Error, Debug)]
pub enum NodeServiceError {
    /// Node (or referenced parent) not found by ID
    #[error("Node not found: {id}")]
    NodeNotFound { id: String },

    /// Validation failed for node
    #[error("Node validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// Re-parenting would place a node beneath its own descendant
    #[error("Moving {id} under {parent_id} would create a cycle")]
    CycleDetected { id: String, parent_id: String },

    /// A node was asked to become its own parent
    #[error("Node {id} cannot be its own parent")]
    SelfParent { id: String },

    /// Delete refused because the node still has children
    #[error("Node {id} has {count} child node(s)")]
    HasChildren { id: String, count: usize },

    /// Invalid update operation
    #[error("Invalid update: {0}")]
    InvalidUpdate(String),

    /// Database operation failed
    #[error("Database operation failed: {0}")]
    DatabaseError(#[from] DatabaseError),
}

impl NodeServiceError {
    /// Create a node not found error
    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NodeNotFound { id: id.into() }
    }

    /// Create a cycle detected error
    pub fn cycle_detected(id: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self::CycleDetected {
            id: id.into(),
            parent_id: parent_id.into(),
        }
    }

    /// Create a self-parent error
    pub fn self_parent(id: impl Into<String>) -> Self {
        Self::SelfParent { id: id.into() }
    }

    /// Create a has-children error
    pub fn has_children(id: impl Into<String>, count: usize) -> Self {
        Self::HasChildren {
            id: id.into(),
            count,
        }
    }

    /// Create an invalid update error
    pub fn invalid_update(msg: impl Into<String>) -> Self {
        Self::InvalidUpdate(msg.into())
    }

    /// Stable machine-readable code for API clients
    pub fn code(&self) -> &'static str {
        match self {
            Self::NodeNotFound { .. } => "NODE_NOT_FOUND",
            Self::ValidationFailed(_) | Self::InvalidUpdate(_) => "VALIDATION_ERROR",
            Self::CycleDetected { .. } => "CYCLE_DETECTED",
            Self::SelfParent { .. } => "SELF_PARENT",
            Self::HasChildren { .. } => "HAS_CHILDREN",
            Self::DatabaseError(_) => "DATABASE_ERROR",
        }
    }
}

/// Map store-level "not found" onto the service variant
pub(crate) fn from_store(err: DatabaseError) -> NodeServiceError {
    match err {
        DatabaseError::RecordNotFound { id } => NodeServiceError::NodeNotFound { id },
        other => NodeServiceError::DatabaseError(other),
    }
}
