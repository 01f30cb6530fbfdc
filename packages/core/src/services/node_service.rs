//! Node Service - Hierarchy Rules over a NodeStore
//!
//! `NodeService` is the only writer of the node collection. It owns every rule
//! the stores do not know about:
//!
//! - per-type validation through `NodeBehaviorRegistry` (page needs a slug,
//!   link needs an href)
//! - slug uniqueness among pages
//! - parent existence, self-parent and cycle checks, all run before any write
//! - sibling order assignment and drag-and-drop renumbering
//! - the configured orphan policy on delete
//! - domain events after each successful write
//!
//! Reads return plain `Node`s or forests built by `crate::tree`.
//!
//! # Concurrency
//!
//! Checks run against a snapshot taken just before the write. Two overlapping
//! re-parents can therefore both pass their checks; the later write wins per
//! record. Admin editing is low-traffic, and this is an accepted limitation.

use crate::behaviors::NodeBehaviorRegistry;
use crate::config::{OrphanPolicy, SiteConfig};
use crate::db::{DatabaseError, DomainEvent, NodeStore};
use crate::models::{
    DeleteResult, Node, NodeFilter, NodeUpdate, PageKind, ValidationError, BIO_KEY, PHOTO_URL_KEY,
    ROLE_KEY, SLUG_KEY, STAFF_NODE_TYPE,
};
use crate::services::error::{from_store, NodeServiceError};
use crate::tree::{
    build_forest, flatten, menu_forest, to_menu_items, FlatEntry, Hierarchy, MenuItem, TreeNode,
};
use crate::utils::{slugify, with_suffix};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Base used by `suggest_slug` when a title yields an empty slug
const FALLBACK_SLUG: &str = "page";

/// Parameters for creating a node
///
/// Leaving `order` unset appends the node after its current siblings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNodeParams {
    /// Optional ID; a UUID v4 is generated when `None`
    #[serde(default)]
    pub id: Option<String>,
    /// `page`, `link`, `container` or `staff`
    pub node_type: String,
    pub title: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub order: Option<i64>,
    /// Menu visibility, defaults to visible
    #[serde(default, alias = "showInMenu")]
    pub visible: Option<bool>,
    #[serde(default)]
    pub properties: Option<Value>,
}

/// Property keys that carry meaning for a node type
fn owned_keys(node_type: &str) -> &'static [&'static str] {
    match node_type.parse::<PageKind>() {
        Ok(kind) => kind.owned_keys(),
        Err(_) if node_type == STAFF_NODE_TYPE => &[ROLE_KEY, BIO_KEY, PHOTO_URL_KEY],
        Err(_) => &[],
    }
}

/// Node types that share one hierarchy with `node_type`
fn family_of(node_type: &str) -> Vec<String> {
    if node_type == STAFF_NODE_TYPE {
        vec![STAFF_NODE_TYPE.to_string()]
    } else {
        PageKind::node_types().map(str::to_string).to_vec()
    }
}

/// Whether two node types belong to the same hierarchy
fn same_family(a: &str, b: &str) -> bool {
    (a == STAFF_NODE_TYPE) == (b == STAFF_NODE_TYPE)
}

/// Business logic over a `NodeStore`
///
/// Cheap to clone; clones share the store, the behavior registry and the
/// event channel.
#[derive(Clone)]
pub struct NodeService {
    store: Arc<dyn NodeStore>,
    behaviors: Arc<NodeBehaviorRegistry>,
    config: Arc<SiteConfig>,
    event_tx: broadcast::Sender<DomainEvent>,
}

impl NodeService {
    /// Create a service with default configuration
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        Self::with_config(store, SiteConfig::default())
    }

    /// Create a service with explicit configuration
    pub fn with_config(store: Arc<dyn NodeStore>, config: SiteConfig) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_channel_capacity.max(1));
        Self {
            store,
            behaviors: Arc::new(NodeBehaviorRegistry::new()),
            config: Arc::new(config),
            event_tx,
        }
    }

    /// Get access to the underlying store
    pub fn store(&self) -> &Arc<dyn NodeStore> {
        &self.store
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Subscribe to domain events emitted after successful writes
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use schoolsite_core::db::{DomainEvent, InMemoryStore};
    /// # use schoolsite_core::services::{CreateNodeParams, NodeService};
    /// # use std::sync::Arc;
    /// # tokio_test::block_on(async {
    /// let service = NodeService::new(Arc::new(InMemoryStore::new()));
    /// let mut rx = service.subscribe_to_events();
    ///
    /// service
    ///     .create_node(CreateNodeParams {
    ///         node_type: "container".into(),
    ///         title: "School Life".into(),
    ///         ..Default::default()
    ///     })
    ///     .await?;
    ///
    /// assert!(matches!(rx.recv().await, Ok(DomainEvent::NodeCreated { .. })));
    /// # Ok::<(), schoolsite_core::services::NodeServiceError>(())
    /// # }).unwrap();
    /// ```
    pub fn subscribe_to_events(&self) -> broadcast::Receiver<DomainEvent> {
        self.event_tx.subscribe()
    }

    /// Ignores send errors: having no subscribers is normal
    fn emit_event(&self, event: DomainEvent) {
        debug!(event = event.event_type(), "Emitting domain event");
        let _ = self.event_tx.send(event);
    }

    //
    // CREATE
    //

    /// Create a node from parameters
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` when the node breaks a structural or per-type
    ///   rule, the slug is taken or the ID is already in use, or the parent
    ///   belongs to the other hierarchy (pages vs staff)
    /// - `SelfParent` / `NodeNotFound` / `CycleDetected` for a bad parent
    #[instrument(skip(self, params), fields(node_type = %params.node_type))]
    pub async fn create_node(&self, params: CreateNodeParams) -> Result<Node, NodeServiceError> {
        let id = params.id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let properties = params
            .properties
            .unwrap_or_else(|| Value::Object(Map::new()));

        let order = match params.order {
            Some(order) => order,
            None => {
                self.next_sibling_order(params.parent_id.as_deref(), &params.node_type)
                    .await?
            }
        };

        let node = Node::new_with_id(id, params.node_type, params.title, params.parent_id, properties)
            .with_order(order)
            .with_visible(params.visible.unwrap_or(true));

        self.insert(node).await
    }

    /// Persist a fully built node (typed wrappers, imports) keeping its order
    #[instrument(skip(self, node), fields(id = %node.id))]
    pub async fn create_from_node(&self, node: Node) -> Result<Node, NodeServiceError> {
        self.insert(node).await
    }

    async fn insert(&self, node: Node) -> Result<Node, NodeServiceError> {
        self.check_new_parent(&node.id, &node.node_type, node.parent_id.as_deref())
            .await?;
        self.behaviors.validate_node(&node)?;
        self.check_slug_available(&node).await?;

        let created = self.store.create_node(node).await.map_err(|e| match e {
            DatabaseError::DuplicateId { id } => NodeServiceError::from(
                ValidationError::InvalidId(format!("ID '{}' is already in use", id)),
            ),
            other => NodeServiceError::from(other),
        })?;

        info!(id = %created.id, node_type = %created.node_type, "Node created");
        self.emit_event(DomainEvent::NodeCreated {
            node: created.clone(),
        });
        Ok(created)
    }

    //
    // READ
    //

    pub async fn get_node(&self, id: &str) -> Result<Option<Node>, NodeServiceError> {
        Ok(self.store.get_node(id).await?)
    }

    /// Like `get_node` but absent nodes are an error
    pub async fn require_node(&self, id: &str) -> Result<Node, NodeServiceError> {
        self.get_node(id)
            .await?
            .ok_or_else(|| NodeServiceError::node_not_found(id))
    }

    /// Nodes matching `filter`, in storage order
    pub async fn list_nodes(&self, filter: NodeFilter) -> Result<Vec<Node>, NodeServiceError> {
        Ok(self.store.query_nodes(filter).await?)
    }

    /// Direct children sorted by `order` (ties in storage order)
    ///
    /// `None` lists nodes without a parent reference.
    pub async fn get_children(&self, parent_id: Option<&str>) -> Result<Vec<Node>, NodeServiceError> {
        if let Some(parent_id) = parent_id {
            self.require_node(parent_id).await?;
        }
        let mut children = self.store.get_children(parent_id).await?;
        children.sort_by_key(|child| child.order);
        Ok(children)
    }

    /// First page whose slug equals `slug`
    pub async fn find_page_by_slug(&self, slug: &str) -> Result<Option<Node>, NodeServiceError> {
        let filter = NodeFilter::new()
            .with_node_type(PageKind::Page.as_str())
            .with_property(SLUG_KEY, Value::String(slug.to_string()))
            .with_limit(1);
        Ok(self.store.query_nodes(filter).await?.into_iter().next())
    }

    //
    // UPDATE
    //

    /// Apply a partial update
    ///
    /// A parent change goes through the same checks as [`Self::move_node`].
    /// A type change drops properties that only the previous type used. The
    /// resulting node is validated in full before anything is written.
    #[instrument(skip(self, update))]
    pub async fn update_node(&self, id: &str, update: NodeUpdate) -> Result<Node, NodeServiceError> {
        let current = self.require_node(id).await?;
        if update.is_empty() {
            return Ok(current);
        }

        let node_type = update
            .node_type
            .clone()
            .unwrap_or_else(|| current.node_type.clone());
        if let Some(new_parent) = &update.parent_id {
            self.check_new_parent(id, &node_type, new_parent.as_deref())
                .await?;
        }
        if !same_family(&node_type, &current.node_type) {
            self.check_family_change(&current, &node_type, update.parent_id.is_none())
                .await?;
        }

        let update = self.with_stale_keys_cleared(&current, update);

        let mut preview = current.clone();
        update.apply_to(&mut preview);
        self.behaviors.validate_node(&preview)?;
        self.check_slug_available(&preview).await?;

        let moved = update.changes_parent() || update.order.is_some();
        let updated = self.store.update_node(id, update).await.map_err(from_store)?;

        info!(id, version = updated.version, "Node updated");
        if moved {
            self.emit_event(DomainEvent::NodeMoved {
                id: updated.id.clone(),
                parent_id: updated.parent_id.clone(),
                order: updated.order,
            });
        }
        self.emit_event(DomainEvent::NodeUpdated {
            node: updated.clone(),
        });
        Ok(updated)
    }

    /// Add `null` entries for properties the target type does not use
    fn with_stale_keys_cleared(&self, current: &Node, mut update: NodeUpdate) -> NodeUpdate {
        let Some(new_type) = update.node_type.as_deref() else {
            return update;
        };
        if new_type == current.node_type {
            return update;
        }

        let keep = owned_keys(new_type);
        let mut stale: Vec<&str> = owned_keys(&current.node_type)
            .iter()
            .copied()
            .filter(|key| !keep.contains(key))
            .collect();
        if let Ok(kind) = new_type.parse::<PageKind>() {
            stale.extend(kind.stale_keys());
        }

        let mut properties = match update.properties.take() {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        for key in stale {
            properties.insert(key.to_string(), Value::Null);
        }
        debug!(
            id = %current.id,
            from = %current.node_type,
            to = new_type,
            "Clearing properties of previous node type"
        );
        update.properties = Some(Value::Object(properties));
        update
    }

    /// Re-parent and/or reposition a node
    ///
    /// Validation order: node exists, new parent differs from the node, new
    /// parent exists and is in the same hierarchy (pages or staff), new parent
    /// is not below the node. Nothing is written unless every check passes;
    /// the write itself is a single-record update.
    ///
    /// With `new_order = None` the node keeps its order when the parent is
    /// unchanged, and is appended after its new siblings otherwise.
    #[instrument(skip(self))]
    pub async fn move_node(
        &self,
        id: &str,
        new_parent_id: Option<&str>,
        new_order: Option<i64>,
    ) -> Result<Node, NodeServiceError> {
        let current = self.require_node(id).await?;
        self.check_new_parent(id, &current.node_type, new_parent_id)
            .await?;

        let same_parent = current.parent_id.as_deref() == new_parent_id;
        let order = match new_order {
            Some(order) => order,
            None if same_parent => current.order,
            None => {
                self.next_sibling_order(new_parent_id, &current.node_type)
                    .await?
            }
        };

        let moved = self
            .store
            .move_node(id, new_parent_id, order)
            .await
            .map_err(from_store)?;

        info!(id, parent_id = ?moved.parent_id, order = moved.order, "Node moved");
        self.emit_event(DomainEvent::NodeMoved {
            id: moved.id.clone(),
            parent_id: moved.parent_id.clone(),
            order: moved.order,
        });
        Ok(moved)
    }

    /// Renumber the children of `parent_id` (`None` = top level)
    ///
    /// Listed children get `order = index`; children left out keep their
    /// relative order after the listed ones. All renumbering is one batch
    /// write.
    ///
    /// Pages and staff keep separate top-level sibling sets. At the top level
    /// the first listed ID selects the set; an empty list means the page tree.
    ///
    /// # Errors
    ///
    /// `InvalidUpdate` when an ID is listed twice or is not a child of
    /// `parent_id`.
    #[instrument(skip(self, ordered_ids))]
    pub async fn reorder_children(
        &self,
        parent_id: Option<&str>,
        ordered_ids: Vec<String>,
    ) -> Result<Vec<Node>, NodeServiceError> {
        let family_type = match (parent_id, ordered_ids.first()) {
            (Some(parent_id), _) => self.require_node(parent_id).await?.node_type,
            (None, Some(first)) => self
                .store
                .get_node(first)
                .await?
                .map(|node| node.node_type)
                .unwrap_or_else(|| PageKind::Container.as_str().to_string()),
            (None, None) => PageKind::Container.as_str().to_string(),
        };
        let children = self.siblings(parent_id, &family_type).await?;
        let child_ids: HashSet<&str> = children.iter().map(|c| c.id.as_str()).collect();

        let mut seen = HashSet::new();
        for id in &ordered_ids {
            if !child_ids.contains(id.as_str()) {
                return Err(NodeServiceError::invalid_update(format!(
                    "'{}' is not a child of {}",
                    id,
                    parent_id.unwrap_or("the top level")
                )));
            }
            if !seen.insert(id.as_str()) {
                return Err(NodeServiceError::invalid_update(format!(
                    "'{}' is listed more than once",
                    id
                )));
            }
        }

        let final_order: Vec<String> = ordered_ids
            .iter()
            .cloned()
            .chain(
                children
                    .iter()
                    .filter(|c| !seen.contains(c.id.as_str()))
                    .map(|c| c.id.clone()),
            )
            .collect();

        let current_order: HashMap<&str, i64> =
            children.iter().map(|c| (c.id.as_str(), c.order)).collect();
        let updates: Vec<(String, NodeUpdate)> = final_order
            .iter()
            .enumerate()
            .filter(|(index, id)| current_order.get(id.as_str()) != Some(&(*index as i64)))
            .map(|(index, id)| (id.clone(), NodeUpdate::new().with_order(index as i64)))
            .collect();

        if !updates.is_empty() {
            self.store.update_nodes(updates).await.map_err(from_store)?;
        }

        info!(parent_id = ?parent_id, count = final_order.len(), "Children reordered");
        self.emit_event(DomainEvent::ChildrenReordered {
            parent_id: parent_id.map(str::to_string),
            child_ids: final_order,
        });

        self.siblings(parent_id, &family_type).await
    }

    //
    // DELETE
    //

    /// Delete a node under the configured [`OrphanPolicy`]
    ///
    /// Deleting a missing node succeeds with `existed = false`.
    #[instrument(skip(self))]
    pub async fn delete_node(&self, id: &str) -> Result<DeleteResult, NodeServiceError> {
        self.delete_node_with_policy(id, self.config.orphan_policy)
            .await
    }

    /// Delete a node with an explicit orphan policy
    #[instrument(skip(self))]
    pub async fn delete_node_with_policy(
        &self,
        id: &str,
        policy: OrphanPolicy,
    ) -> Result<DeleteResult, NodeServiceError> {
        if self.store.get_node(id).await?.is_none() {
            debug!(id, "Delete of missing node is a no-op");
            return Ok(DeleteResult::not_found());
        }

        let children = self.store.get_children(Some(id)).await?;

        let result = match policy {
            OrphanPolicy::LeaveDangling => {
                if !children.is_empty() {
                    debug!(id, children = children.len(), "Leaving dangling children");
                }
                self.store.delete_node(id).await?
            }
            OrphanPolicy::Restrict => {
                if !children.is_empty() {
                    return Err(NodeServiceError::has_children(id, children.len()));
                }
                self.store.delete_node(id).await?
            }
            OrphanPolicy::PromoteToRoot => {
                let updates: Vec<(String, NodeUpdate)> = children
                    .iter()
                    .map(|c| (c.id.clone(), NodeUpdate::new().with_parent(None)))
                    .collect();
                let promoted = if updates.is_empty() {
                    Vec::new()
                } else {
                    self.store.update_nodes(updates).await.map_err(from_store)?
                };
                let result = self.store.delete_node(id).await?;
                for child in promoted {
                    self.emit_event(DomainEvent::NodeMoved {
                        id: child.id,
                        parent_id: None,
                        order: child.order,
                    });
                }
                result
            }
            OrphanPolicy::Cascade => {
                let snapshot = self.store.list_all().await?;
                let descendants = Hierarchy::new(&snapshot).descendant_ids(id);
                let mut ids = Vec::with_capacity(descendants.len() + 1);
                ids.push(id.to_string());
                ids.extend(descendants);

                let removed = self.store.delete_nodes(&ids).await?;
                let cascaded: Vec<String> = removed.into_iter().filter(|r| r != id).collect();
                for child_id in &cascaded {
                    self.emit_event(DomainEvent::NodeDeleted {
                        id: child_id.clone(),
                    });
                }
                DeleteResult {
                    existed: true,
                    cascaded,
                }
            }
        };

        info!(id, ?policy, cascaded = result.cascaded.len(), "Node deleted");
        self.emit_event(DomainEvent::NodeDeleted { id: id.to_string() });
        Ok(result)
    }

    //
    // TREES
    //

    /// Ordered forest of every node matching `filter`
    pub async fn forest(&self, filter: NodeFilter) -> Result<Vec<TreeNode>, NodeServiceError> {
        let nodes = self.store.query_nodes(filter).await?;
        Ok(build_forest(&nodes))
    }

    /// Page, link and container forest (the site structure)
    pub async fn page_forest(&self) -> Result<Vec<TreeNode>, NodeServiceError> {
        self.forest(NodeFilter::new().with_node_types(PageKind::node_types()))
            .await
    }

    /// Staff org chart
    pub async fn org_chart(&self) -> Result<Vec<TreeNode>, NodeServiceError> {
        self.forest(NodeFilter::new().with_node_type(STAFF_NODE_TYPE))
            .await
    }

    /// Navigation menu: the page forest projected with the configured
    /// hidden-node policy
    pub async fn menu(&self) -> Result<Vec<TreeNode>, NodeServiceError> {
        let forest = self.page_forest().await?;
        Ok(menu_forest(&forest, self.config.hidden_policy))
    }

    /// Menu shaped for the site renderer
    pub async fn menu_items(&self) -> Result<Vec<MenuItem>, NodeServiceError> {
        Ok(to_menu_items(&self.menu().await?))
    }

    /// Nodes `id` may be moved under, depth-annotated for a picker
    ///
    /// Excludes the node itself and its whole subtree, and stays within the
    /// node's own hierarchy (pages or staff).
    #[instrument(skip(self))]
    pub async fn parent_candidates(&self, id: &str) -> Result<Vec<FlatEntry>, NodeServiceError> {
        let node = self.require_node(id).await?;
        let family = self
            .store
            .query_nodes(NodeFilter::new().with_node_types(family_of(&node.node_type)))
            .await?;

        let excluded: HashSet<String> = {
            let hierarchy = Hierarchy::new(&family);
            let mut excluded: HashSet<String> = hierarchy.descendant_ids(id).into_iter().collect();
            excluded.insert(id.to_string());
            excluded
        };

        let candidates: Vec<Node> = family
            .into_iter()
            .filter(|candidate| !excluded.contains(&candidate.id))
            .collect();
        Ok(flatten(&build_forest(&candidates)))
    }

    /// Root-to-node path for page headers
    pub async fn breadcrumbs(&self, id: &str) -> Result<Vec<Node>, NodeServiceError> {
        self.require_node(id).await?;
        let snapshot = self.store.list_all().await?;
        let hierarchy = Hierarchy::new(&snapshot).with_walk_limit(self.config.ancestor_walk_limit);
        Ok(hierarchy.ancestors_path(id).into_iter().cloned().collect())
    }

    //
    // SLUGS
    //

    /// Unique slug for `title`, suffixed `-2`, `-3`, … on collision
    ///
    /// `exclude_id` is the page being edited, whose own slug does not count
    /// as a collision.
    pub async fn suggest_slug(
        &self,
        title: &str,
        exclude_id: Option<&str>,
    ) -> Result<String, NodeServiceError> {
        let base = match slugify(title) {
            slug if slug.is_empty() => FALLBACK_SLUG.to_string(),
            slug => slug,
        };

        let taken: HashSet<String> = self
            .store
            .query_nodes(NodeFilter::new().with_node_type(PageKind::Page.as_str()))
            .await?
            .into_iter()
            .filter(|page| Some(page.id.as_str()) != exclude_id)
            .filter_map(|page| page.property_str(SLUG_KEY).map(str::to_string))
            .collect();

        if !taken.contains(&base) {
            return Ok(base);
        }
        let suffixed = (2..)
            .map(|n| with_suffix(&base, n))
            .find(|candidate| !taken.contains(candidate));
        Ok(suffixed.unwrap_or(base))
    }

    //
    // CHECKS
    //

    /// Self-parent, existence, hierarchy and cycle checks for placing `id`
    /// (of type `node_type`) under `parent_id`
    async fn check_new_parent(
        &self,
        id: &str,
        node_type: &str,
        parent_id: Option<&str>,
    ) -> Result<(), NodeServiceError> {
        let Some(parent_id) = parent_id else {
            return Ok(());
        };

        if parent_id == id {
            return Err(NodeServiceError::self_parent(id));
        }

        let parent = self
            .store
            .get_node(parent_id)
            .await?
            .ok_or_else(|| NodeServiceError::node_not_found(parent_id))?;
        check_parent_family(node_type, &parent)?;

        let snapshot = self.store.list_all().await?;
        let hierarchy = Hierarchy::new(&snapshot).with_walk_limit(self.config.ancestor_walk_limit);
        if hierarchy.is_descendant(id, parent_id) {
            warn!(id, parent_id, "Rejected move that would create a cycle");
            return Err(NodeServiceError::cycle_detected(id, parent_id));
        }

        Ok(())
    }

    /// A node switching between the page tree and the staff tree must not
    /// keep a parent or children from the hierarchy it leaves
    ///
    /// `keeps_parent` is false when the same update also sets a new parent,
    /// which `check_new_parent` has already validated.
    async fn check_family_change(
        &self,
        current: &Node,
        node_type: &str,
        keeps_parent: bool,
    ) -> Result<(), NodeServiceError> {
        if keeps_parent {
            if let Some(parent_id) = current.parent_id.as_deref() {
                // dangling references stay as they are
                if let Some(parent) = self.store.get_node(parent_id).await? {
                    check_parent_family(node_type, &parent)?;
                }
            }
        }

        if !self.store.get_children(Some(&current.id)).await?.is_empty() {
            return Err(ValidationError::InvalidNodeType(format!(
                "'{}' has children and cannot become a {} node",
                current.id, node_type
            ))
            .into());
        }
        Ok(())
    }

    /// Pages must not share a slug
    async fn check_slug_available(&self, node: &Node) -> Result<(), NodeServiceError> {
        if !self.behaviors.uses_slug(&node.node_type) {
            return Ok(());
        }
        let Some(slug) = node.property_str(SLUG_KEY) else {
            return Ok(());
        };

        let clash = self
            .store
            .query_nodes(
                NodeFilter::new()
                    .with_node_type(node.node_type.clone())
                    .with_property(SLUG_KEY, Value::String(slug.to_string())),
            )
            .await?
            .into_iter()
            .any(|other| other.id != node.id);

        if clash {
            return Err(ValidationError::DuplicateSlug(slug.to_string()).into());
        }
        Ok(())
    }

    /// Children of `parent_id` in the hierarchy of `node_type`, sorted by
    /// `order` (ties in storage order)
    async fn siblings(
        &self,
        parent_id: Option<&str>,
        node_type: &str,
    ) -> Result<Vec<Node>, NodeServiceError> {
        let mut siblings: Vec<Node> = self
            .store
            .get_children(parent_id)
            .await?
            .into_iter()
            .filter(|sibling| same_family(&sibling.node_type, node_type))
            .collect();
        siblings.sort_by_key(|sibling| sibling.order);
        Ok(siblings)
    }

    /// `max(order) + 1` among the siblings a `node_type` node would get under
    /// `parent_id`, or 0 when there are none
    async fn next_sibling_order(
        &self,
        parent_id: Option<&str>,
        node_type: &str,
    ) -> Result<i64, NodeServiceError> {
        let siblings = self.siblings(parent_id, node_type).await?;
        Ok(siblings
            .iter()
            .map(|s| s.order)
            .max()
            .map_or(0, |max| max.saturating_add(1)))
    }
}

/// Pages nest under page-tree nodes, staff under staff
fn check_parent_family(node_type: &str, parent: &Node) -> Result<(), NodeServiceError> {
    if same_family(node_type, &parent.node_type) {
        return Ok(());
    }
    Err(ValidationError::InvalidParent(format!(
        "a {} node cannot be placed under {} node '{}'",
        node_type, parent.node_type, parent.id
    ))
    .into())
}

// Behavioral tests in separate module
#[cfg(test)]
#[path = "node_service_test.rs"]
mod node_service_test;
