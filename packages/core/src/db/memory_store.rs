//! InMemoryStore - NodeStore backed by process memory
//!
//! Records keep their insertion order so listings are deterministic, which
//! matters for the forest builder's tie-break on equal `order` values. Every
//! mutation runs inside one write-lock critical section.

use crate::db::{DatabaseError, NodeStore, StoreResult};
use crate::models::{DeleteResult, Node, NodeUpdate};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Insertion-ordered record set shared by the in-memory and file backends
#[derive(Debug, Clone, Default)]
pub(crate) struct Records {
    order: Vec<String>,
    by_id: HashMap<String, Node>,
}

impl Records {
    /// Build from a loaded list; later duplicates of an ID are ignored
    pub(crate) fn from_nodes(nodes: Vec<Node>) -> (Self, Vec<String>) {
        let mut records = Self::default();
        let mut skipped = Vec::new();
        for node in nodes {
            if records.by_id.contains_key(&node.id) {
                skipped.push(node.id);
                continue;
            }
            records.order.push(node.id.clone());
            records.by_id.insert(node.id.clone(), node);
        }
        (records, skipped)
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn get(&self, id: &str) -> Option<&Node> {
        self.by_id.get(id)
    }

    pub(crate) fn to_vec(&self) -> Vec<Node> {
        self.order
            .iter()
            .filter_map(|id| self.by_id.get(id))
            .cloned()
            .collect()
    }

    pub(crate) fn insert(&mut self, node: Node) -> StoreResult<Node> {
        if self.by_id.contains_key(&node.id) {
            return Err(DatabaseError::duplicate_id(&node.id));
        }
        self.order.push(node.id.clone());
        self.by_id.insert(node.id.clone(), node.clone());
        Ok(node)
    }

    pub(crate) fn update(&mut self, id: &str, update: &NodeUpdate) -> StoreResult<Node> {
        let node = self
            .by_id
            .get_mut(id)
            .ok_or_else(|| DatabaseError::record_not_found(id))?;
        update.apply_to(node);
        Ok(node.clone())
    }

    pub(crate) fn update_many(&mut self, updates: &[(String, NodeUpdate)]) -> StoreResult<Vec<Node>> {
        if let Some((missing, _)) = updates.iter().find(|(id, _)| !self.by_id.contains_key(id)) {
            return Err(DatabaseError::record_not_found(missing));
        }
        updates
            .iter()
            .map(|(id, update)| self.update(id, update))
            .collect()
    }

    pub(crate) fn remove(&mut self, id: &str) -> DeleteResult {
        match self.by_id.remove(id) {
            Some(_) => {
                self.order.retain(|existing| existing != id);
                DeleteResult::existed()
            }
            None => DeleteResult::not_found(),
        }
    }

    pub(crate) fn remove_many(&mut self, ids: &[String]) -> Vec<String> {
        let removed: Vec<String> = ids
            .iter()
            .filter(|id| self.by_id.remove(id.as_str()).is_some())
            .cloned()
            .collect();
        if !removed.is_empty() {
            let gone: HashSet<&str> = removed.iter().map(String::as_str).collect();
            self.order.retain(|existing| !gone.contains(existing.as_str()));
        }
        removed
    }
}

/// Volatile NodeStore implementation
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<Records>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `nodes` (first duplicate ID wins)
    pub fn with_nodes(nodes: Vec<Node>) -> Self {
        let (records, skipped) = Records::from_nodes(nodes);
        if !skipped.is_empty() {
            warn!(?skipped, "Ignoring duplicate node IDs in seed data");
        }
        Self {
            records: RwLock::new(records),
        }
    }

    /// Number of stored nodes
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl NodeStore for InMemoryStore {
    async fn create_node(&self, node: Node) -> StoreResult<Node> {
        self.records.write().await.insert(node)
    }

    async fn get_node(&self, id: &str) -> StoreResult<Option<Node>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn update_node(&self, id: &str, update: NodeUpdate) -> StoreResult<Node> {
        self.records.write().await.update(id, &update)
    }

    async fn delete_node(&self, id: &str) -> StoreResult<DeleteResult> {
        Ok(self.records.write().await.remove(id))
    }

    async fn update_nodes(&self, updates: Vec<(String, NodeUpdate)>) -> StoreResult<Vec<Node>> {
        self.records.write().await.update_many(&updates)
    }

    async fn delete_nodes(&self, ids: &[String]) -> StoreResult<Vec<String>> {
        let removed = self.records.write().await.remove_many(ids);
        debug!(requested = ids.len(), removed = removed.len(), "Batch delete");
        Ok(removed)
    }

    async fn list_all(&self) -> StoreResult<Vec<Node>> {
        Ok(self.records.read().await.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodeFilter;
    use serde_json::json;

    fn node(id: &str, parent: Option<&str>) -> Node {
        Node::new_with_id(id, "container", id, parent.map(str::to_string), json!({}))
    }

    #[tokio::test]
    async fn test_crud_round_trip() {
        let store = InMemoryStore::new();
        store.create_node(node("a", None)).await.unwrap();

        let updated = store
            .update_node("a", NodeUpdate::new().with_title("Renamed"))
            .await
            .unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.version, 2);

        let deleted = store.delete_node("a").await.unwrap();
        assert!(deleted.existed);
        assert!(store.get_node("a").await.unwrap().is_none());

        let again = store.delete_node("a").await.unwrap();
        assert!(!again.existed);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let store = InMemoryStore::new();
        store.create_node(node("a", None)).await.unwrap();

        let err = store.create_node(node("a", None)).await.unwrap_err();
        assert!(matches!(err, DatabaseError::DuplicateId { .. }));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_missing_record() {
        let store = InMemoryStore::new();
        let err = store
            .update_node("ghost", NodeUpdate::new().with_order(1))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::RecordNotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_nodes_is_all_or_nothing() {
        let store = InMemoryStore::with_nodes(vec![node("a", None), node("b", None)]);

        let err = store
            .update_nodes(vec![
                ("a".to_string(), NodeUpdate::new().with_order(5)),
                ("ghost".to_string(), NodeUpdate::new().with_order(6)),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::RecordNotFound { .. }));

        let a = store.get_node("a").await.unwrap().unwrap();
        assert_eq!(a.order, 0);
        assert_eq!(a.version, 1);
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let store = InMemoryStore::with_nodes(vec![node("c", None), node("a", None), node("b", None)]);
        store.delete_node("a").await.unwrap();
        store.create_node(node("d", None)).await.unwrap();

        let ids: Vec<String> = store.list_all().await.unwrap().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, ["c", "b", "d"]);
    }

    #[tokio::test]
    async fn test_query_and_children() {
        let store = InMemoryStore::with_nodes(vec![
            node("root", None),
            node("x", Some("root")),
            node("y", Some("root")),
            node("z", None),
        ]);

        let kids = store.get_children(Some("root")).await.unwrap();
        assert_eq!(kids.len(), 2);

        let roots = store.get_children(None).await.unwrap();
        assert_eq!(roots.len(), 2);

        let limited = store
            .query_nodes(NodeFilter::new().with_limit(3))
            .await
            .unwrap();
        assert_eq!(limited.len(), 3);
    }

    #[tokio::test]
    async fn test_move_node_default_impl() {
        let store = InMemoryStore::with_nodes(vec![node("p", None), node("c", None)]);

        let moved = store.move_node("c", Some("p"), 7).await.unwrap();
        assert_eq!(moved.parent_id.as_deref(), Some("p"));
        assert_eq!(moved.order, 7);
    }

    #[tokio::test]
    async fn test_delete_nodes_reports_removed() {
        let store = InMemoryStore::with_nodes(vec![node("a", None), node("b", None)]);

        let removed = store
            .delete_nodes(&["a".to_string(), "ghost".to_string()])
            .await
            .unwrap();
        assert_eq!(removed, ["a"]);
        assert_eq!(store.len().await, 1);
    }

    #[test]
    fn test_seed_duplicates_first_wins() {
        let (records, skipped) = Records::from_nodes(vec![
            node("a", None),
            Node::new_with_id("a", "page", "Second", None, json!({})),
        ]);
        assert_eq!(records.len(), 1);
        assert_eq!(records.get("a").unwrap().title, "a");
        assert_eq!(skipped, ["a"]);
    }
}
