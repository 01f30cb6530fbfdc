//! Domain Events
//!
//! Events emitted by `NodeService` after a write has been persisted. Consumers
//! (cache invalidation, a live admin preview) subscribe through a tokio
//! broadcast channel and never couple to the storage backend.
//!
//! # Event Flow
//!
//! 1. `NodeService` validates and persists a change through `NodeStore`
//! 2. The matching `DomainEvent` is sent on the broadcast channel
//! 3. Every subscriber receives its own clone asynchronously
//!
//! Sending with no subscribers is not an error; the event is simply dropped.

use crate::models::Node;
use serde::{Deserialize, Serialize};

/// Domain events describing persisted hierarchy changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DomainEvent {
    /// A new node was created
    #[serde(rename = "node:created")]
    NodeCreated { node: Node },

    /// Fields other than the position changed
    #[serde(rename = "node:updated")]
    NodeUpdated { node: Node },

    /// A node changed parent and/or order
    #[serde(rename = "node:moved", rename_all = "camelCase")]
    NodeMoved {
        id: String,
        parent_id: Option<String>,
        order: i64,
    },

    /// A node was deleted
    #[serde(rename = "node:deleted")]
    NodeDeleted { id: String },

    /// Siblings under `parent_id` (`None` = top level) were renumbered
    #[serde(rename = "children:reordered", rename_all = "camelCase")]
    ChildrenReordered {
        parent_id: Option<String>,
        child_ids: Vec<String>,
    },
}

impl DomainEvent {
    /// Get a string representation of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::NodeCreated { .. } => "node:created",
            DomainEvent::NodeUpdated { .. } => "node:updated",
            DomainEvent::NodeMoved { .. } => "node:moved",
            DomainEvent::NodeDeleted { .. } => "node:deleted",
            DomainEvent::ChildrenReordered { .. } => "children:reordered",
        }
    }

    /// ID of the node the event is about (the parent for reorders)
    pub fn subject_id(&self) -> Option<&str> {
        match self {
            DomainEvent::NodeCreated { node } | DomainEvent::NodeUpdated { node } => {
                Some(&node.id)
            }
            DomainEvent::NodeMoved { id, .. } | DomainEvent::NodeDeleted { id } => Some(id),
            DomainEvent::ChildrenReordered { parent_id, .. } => parent_id.as_deref(),
        }
    }
}
