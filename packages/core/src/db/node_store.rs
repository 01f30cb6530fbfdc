//! NodeStore Trait - Persistence Abstraction Layer
//!
//! `NodeService` talks to storage only through this trait, so the in-memory
//! backend used by tests and the JSON document backend used in production are
//! interchangeable.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: every method is async so file-backed and future network
//!    backends share one signature
//! 2. **Ownership Semantics**: methods take ownership of values (caller clones
//!    if needed)
//! 3. **Atomic per call**: a single call either fully applies or leaves the
//!    store untouched, including the batch methods
//! 4. **No business rules**: kind validation, cycle checks and slug
//!    uniqueness live in `NodeService`
//!
//! # Examples
//!
//! ```rust
//! use schoolsite_core::db::{InMemoryStore, NodeStore};
//! use schoolsite_core::models::Node;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let store: Arc<dyn NodeStore> = Arc::new(InMemoryStore::new());
//!
//! let node = Node::new("container", "School Life", None, json!({}));
//! let created = store.create_node(node).await?;
//! assert!(store.get_node(&created.id).await?.is_some());
//! # Ok::<(), schoolsite_core::db::DatabaseError>(())
//! # }).unwrap();
//! ```

use crate::db::DatabaseError;
use crate::models::{DeleteResult, Node, NodeFilter, NodeUpdate, ParentFilter};
use async_trait::async_trait;

/// Result alias for store operations
pub type StoreResult<T> = Result<T, DatabaseError>;

/// Abstraction layer for node persistence operations
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a single store can be shared
/// behind an `Arc` across request handlers.
#[async_trait]
pub trait NodeStore: Send + Sync {
    //
    // CORE CRUD OPERATIONS
    //

    /// Persist a new node
    ///
    /// # Errors
    ///
    /// `DatabaseError::DuplicateId` when a node with the same ID is stored.
    async fn create_node(&self, node: Node) -> StoreResult<Node>;

    /// Get node by ID (`Ok(None)` when absent)
    async fn get_node(&self, id: &str) -> StoreResult<Option<Node>>;

    /// Apply a sparse update and return the full updated node
    ///
    /// # Errors
    ///
    /// `DatabaseError::RecordNotFound` when the node is not stored.
    async fn update_node(&self, id: &str, update: NodeUpdate) -> StoreResult<Node>;

    /// Remove a node; missing IDs yield `DeleteResult::not_found()`
    async fn delete_node(&self, id: &str) -> StoreResult<DeleteResult>;

    //
    // BATCH OPERATIONS
    //

    /// Apply several updates as one write
    ///
    /// Every ID is checked before anything changes; if one is missing nothing
    /// is written.
    async fn update_nodes(&self, updates: Vec<(String, NodeUpdate)>) -> StoreResult<Vec<Node>>;

    /// Remove several nodes as one write, returning the IDs actually removed
    async fn delete_nodes(&self, ids: &[String]) -> StoreResult<Vec<String>>;

    //
    // QUERYING
    //

    /// Every stored node in insertion order
    async fn list_all(&self) -> StoreResult<Vec<Node>>;

    /// Nodes matching `filter`, in insertion order
    async fn query_nodes(&self, filter: NodeFilter) -> StoreResult<Vec<Node>> {
        let limit = filter.limit.unwrap_or(usize::MAX);
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .filter(|node| filter.matches(node))
            .take(limit)
            .collect())
    }

    /// Direct children of `parent_id` (`None` = nodes without a parent)
    ///
    /// Children are returned unsorted; callers order them by `order`.
    async fn get_children(&self, parent_id: Option<&str>) -> StoreResult<Vec<Node>> {
        let parent = match parent_id {
            Some(id) => ParentFilter::Id(id.to_string()),
            None => ParentFilter::Root,
        };
        self.query_nodes(NodeFilter {
            parent: Some(parent),
            ..Default::default()
        })
        .await
    }

    //
    // HIERARCHY
    //

    /// Write a new parent reference and order in a single record update
    async fn move_node(
        &self,
        id: &str,
        new_parent_id: Option<&str>,
        new_order: i64,
    ) -> StoreResult<Node> {
        let update = NodeUpdate::new()
            .with_parent(new_parent_id.map(str::to_string))
            .with_order(new_order);
        self.update_node(id, update).await
    }
}
