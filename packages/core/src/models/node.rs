//! Node Data Structures
//!
//! This module defines the universal `Node` record shared by the page/menu
//! tree and the staff org chart, together with the partial update, filter and
//! delete-result types used by the persistence layer.
//!
//! # Architecture
//!
//! - **Universal Node**: Single struct represents pages, links, containers and staff members
//! - **Type-specific data in `properties`**: slug, href, content, role, bio, photo
//! - **Self-referential hierarchy**: `parent_id` points at another node, `order` sorts siblings
//!
//! # Examples
//!
//! ```rust
//! use schoolsite_core::models::Node;
//! use serde_json::json;
//!
//! // A top-level menu page
//! let about = Node::new("page", "About Us", None, json!({ "slug": "about-us" }));
//!
//! // A child page under it
//! let history = Node::new(
//!     "page",
//!     "Our History",
//!     Some(about.id.clone()),
//!     json!({ "slug": "our-history" }),
//! );
//! assert_eq!(history.parent_id.as_deref(), Some(about.id.as_str()));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Default version value for serde deserialization (version 1)
fn default_version() -> i64 {
    1
}

/// Nodes participate in navigation unless explicitly hidden
fn default_visible() -> bool {
    true
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

/// Validation errors for Node operations
///
/// Every variant carries enough detail (field name, offending value) for an
/// admin form to render an actionable message next to the right input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid node type: {0}")]
    InvalidNodeType(String),

    #[error("Invalid node ID format: {0}")]
    InvalidId(String),

    #[error("Invalid parent reference: {0}")]
    InvalidParent(String),

    #[error("Properties validation failed: {0}")]
    InvalidProperties(String),

    #[error("Slug '{0}' is already used by another page")]
    DuplicateSlug(String),
}

impl ValidationError {
    /// Name of the form field this error refers to, when there is one
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingField(field) => Some(field),
            Self::InvalidNodeType(_) => Some("nodeType"),
            Self::InvalidId(_) => Some("id"),
            Self::InvalidParent(_) => Some("parentId"),
            Self::InvalidProperties(_) => Some("properties"),
            Self::DuplicateSlug(_) => Some("slug"),
        }
    }
}

/// Universal Node structure for every record in a hierarchy.
///
/// # Fields
///
/// - `id`: Unique identifier (UUID v4 when generated here)
/// - `node_type`: `page`, `link`, `container` or `staff`
/// - `title`: Human-readable label (menu text, staff member name)
/// - `parent_id`: Optional reference to the parent node (`None` means root)
/// - `order`: Sibling sort key, not required to be unique
/// - `visible`: Whether the node shows up in the navigation menu
/// - `properties`: JSON object with type-specific fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique identifier, immutable after creation
    pub id: String,

    /// Node type (`page`, `link`, `container`, `staff`)
    pub node_type: String,

    /// Display name
    pub title: String,

    /// Parent node ID (`None` means this node is a root)
    #[serde(default)]
    pub parent_id: Option<String>,

    /// Sibling position, ascending; missing values deserialize as 0
    #[serde(default)]
    pub order: i64,

    /// Menu participation (`showInMenu` on pages)
    #[serde(default = "default_visible", alias = "showInMenu")]
    pub visible: bool,

    /// Incremented on each successful write
    #[serde(default = "default_version")]
    pub version: i64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub modified_at: DateTime<Utc>,

    /// Type-specific fields
    #[serde(default = "empty_object")]
    pub properties: Value,
}

impl Node {
    /// Create a new Node with auto-generated UUID
    ///
    /// The node starts at `order = 0`, visible, version 1.
    pub fn new(
        node_type: impl Into<String>,
        title: impl Into<String>,
        parent_id: Option<String>,
        properties: Value,
    ) -> Self {
        Self::new_with_id(
            Uuid::new_v4().to_string(),
            node_type,
            title,
            parent_id,
            properties,
        )
    }

    /// Create a new Node with a caller-chosen ID
    ///
    /// Used by persistence adapters that import records with pre-existing
    /// identifiers, and by tests that want readable IDs.
    pub fn new_with_id(
        id: impl Into<String>,
        node_type: impl Into<String>,
        title: impl Into<String>,
        parent_id: Option<String>,
        properties: Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            node_type: node_type.into(),
            title: title.into(),
            parent_id,
            order: 0,
            visible: true,
            version: 1,
            created_at: now,
            modified_at: now,
            properties,
        }
    }

    /// Builder-style setter for the sibling order
    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    /// Builder-style setter for menu visibility
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Validate structural fields shared by every node type
    ///
    /// Type-specific rules (slug for pages, href for links) live in
    /// [`crate::behaviors`].
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if:
    /// - `id` or `node_type` is empty
    /// - `title` is blank
    /// - `properties` is not a JSON object
    /// - the node references itself as parent
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::MissingField("id".to_string()));
        }

        if self.node_type.is_empty() {
            return Err(ValidationError::MissingField("nodeType".to_string()));
        }

        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title".to_string()));
        }

        if !self.properties.is_object() {
            return Err(ValidationError::InvalidProperties(
                "properties must be a JSON object".to_string(),
            ));
        }

        if self.parent_id.as_deref() == Some(self.id.as_str()) {
            return Err(ValidationError::InvalidParent(
                "Node cannot be its own parent".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether this node has no parent reference at all
    ///
    /// A node whose parent reference dangles is still treated as a root by
    /// the tree builder even though this returns `false`.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// String property lookup (`None` when missing or not a string)
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(|v| v.as_str())
    }

    /// Set a single property, creating the properties object if needed
    pub fn set_property(&mut self, key: &str, value: Value) {
        if !self.properties.is_object() {
            self.properties = empty_object();
        }
        if let Some(obj) = self.properties.as_object_mut() {
            obj.insert(key.to_string(), value);
        }
        self.modified_at = Utc::now();
    }

    /// Remove a property, returning the previous value
    pub fn remove_property(&mut self, key: &str) -> Option<Value> {
        let removed = self.properties.as_object_mut()?.remove(key);
        if removed.is_some() {
            self.modified_at = Utc::now();
        }
        removed
    }

    /// Shallow-merge properties; a `null` value removes the key
    pub fn merge_properties(&mut self, updates: &Value) {
        let Some(new) = updates.as_object() else {
            return;
        };
        if !self.properties.is_object() {
            self.properties = empty_object();
        }
        if let Some(existing) = self.properties.as_object_mut() {
            for (key, value) in new {
                if value.is_null() {
                    existing.remove(key);
                } else {
                    existing.insert(key.clone(), value.clone());
                }
            }
        }
        self.modified_at = Utc::now();
    }
}

/// Custom deserializer for optional fields that accepts both plain values and nested Options
///
/// Maps three input formats to the double-Option pattern:
/// - Missing field → None (don't update)
/// - null → Some(None) (set to NULL)
/// - "value" → Some(Some("value")) (set to value)
fn deserialize_optional_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::<T>::deserialize(deserializer)?))
}

/// Partial node update structure for PATCH operations
///
/// All fields are optional. Only provided fields are changed.
///
/// # Double-Option Pattern for `parent_id`
///
/// - `None`: Don't change the parent
/// - `Some(None)`: Make the node a root
/// - `Some(Some(id))`: Re-parent under `id`
///
/// `properties` is shallow-merged into the existing object; keys mapped to
/// `null` are removed.
///
/// # Examples
///
/// ```rust
/// # use schoolsite_core::models::NodeUpdate;
/// // Rename only
/// let update = NodeUpdate::new().with_title("Admissions");
///
/// // Promote to root and move to the front
/// let update = NodeUpdate {
///     parent_id: Some(None),
///     order: Some(0),
///     ..Default::default()
/// };
/// assert!(!update.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeUpdate {
    /// Update node type (page kind transitions)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,

    /// Update display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Update parent reference (double-Option)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub parent_id: Option<Option<String>>,

    /// Update sibling order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,

    /// Update menu visibility
    #[serde(skip_serializing_if = "Option::is_none", alias = "showInMenu")]
    pub visible: Option<bool>,

    /// Shallow-merge into properties
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,
}

impl NodeUpdate {
    /// Create a new empty NodeUpdate
    pub fn new() -> Self {
        Self::default()
    }

    /// Set title update
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set node type update
    pub fn with_node_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = Some(node_type.into());
        self
    }

    /// Set parent update (`None` makes the node a root)
    pub fn with_parent(mut self, parent_id: Option<String>) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Set order update
    pub fn with_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    /// Set visibility update
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    /// Set properties merge
    pub fn with_properties(mut self, properties: Value) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Check if update contains any changes
    pub fn is_empty(&self) -> bool {
        self.node_type.is_none()
            && self.title.is_none()
            && self.parent_id.is_none()
            && self.order.is_none()
            && self.visible.is_none()
            && self.properties.is_none()
    }

    /// Whether this update touches the hierarchy (parent reference)
    pub fn changes_parent(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Apply the update to a node in place
    ///
    /// Bumps `version` and `modified_at`. No validation happens here; callers
    /// validate the resulting node.
    pub fn apply_to(&self, node: &mut Node) {
        if let Some(node_type) = &self.node_type {
            node.node_type = node_type.clone();
        }
        if let Some(title) = &self.title {
            node.title = title.clone();
        }
        if let Some(parent_id) = &self.parent_id {
            node.parent_id = parent_id.clone();
        }
        if let Some(order) = self.order {
            node.order = order;
        }
        if let Some(visible) = self.visible {
            node.visible = visible;
        }
        if let Some(properties) = &self.properties {
            node.merge_properties(properties);
        }
        node.version += 1;
        node.modified_at = Utc::now();
    }
}

/// Result of a delete operation
///
/// DELETE is idempotent: deleting a missing node succeeds, and `existed`
/// reports whether anything was actually removed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteResult {
    /// Whether the node existed before deletion
    pub existed: bool,

    /// IDs removed alongside the node (cascade deletes only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cascaded: Vec<String>,
}

impl DeleteResult {
    /// Create a DeleteResult indicating the node existed
    pub fn existed() -> Self {
        Self {
            existed: true,
            cascaded: Vec::new(),
        }
    }

    /// Create a DeleteResult indicating the node didn't exist
    pub fn not_found() -> Self {
        Self {
            existed: false,
            cascaded: Vec::new(),
        }
    }
}

/// Parent constraint for node queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentFilter {
    /// Nodes with no parent reference
    Root,
    /// Direct children of the given node
    Id(String),
}

/// Filter for querying nodes
///
/// All set constraints must match (AND). An empty filter matches everything.
///
/// # Examples
///
/// ```rust
/// # use schoolsite_core::models::NodeFilter;
/// # use serde_json::json;
/// // Every visible page
/// let filter = NodeFilter::new()
///     .with_node_type("page")
///     .with_visible(true);
///
/// // Staff members in a department
/// let filter = NodeFilter::new()
///     .with_node_type("staff")
///     .with_property("department", json!("Science"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeFilter {
    /// Accepted node types (empty = any)
    pub node_types: Vec<String>,

    /// Parent constraint
    pub parent: Option<ParentFilter>,

    /// Menu visibility constraint
    pub visible: Option<bool>,

    /// Property equality constraints (string/bool/number JSON values)
    pub property_equals: Vec<(String, Value)>,

    /// Maximum number of results
    pub limit: Option<usize>,
}

impl NodeFilter {
    /// Create a new empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an accepted node type
    pub fn with_node_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_types.push(node_type.into());
        self
    }

    /// Accept several node types at once
    pub fn with_node_types<I, S>(mut self, node_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.node_types.extend(node_types.into_iter().map(Into::into));
        self
    }

    /// Only direct children of `parent_id`
    pub fn with_parent_id(mut self, parent_id: impl Into<String>) -> Self {
        self.parent = Some(ParentFilter::Id(parent_id.into()));
        self
    }

    /// Only nodes without a parent reference
    pub fn roots_only(mut self) -> Self {
        self.parent = Some(ParentFilter::Root);
        self
    }

    /// Filter by menu visibility
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    /// Require `properties[key] == value`
    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.property_equals.push((key.into(), value));
        self
    }

    /// Cap the number of results
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a node satisfies every constraint (limit is not considered)
    pub fn matches(&self, node: &Node) -> bool {
        if !self.node_types.is_empty() && !self.node_types.iter().any(|t| t == &node.node_type) {
            return false;
        }

        match &self.parent {
            Some(ParentFilter::Root) if node.parent_id.is_some() => return false,
            Some(ParentFilter::Id(id)) if node.parent_id.as_deref() != Some(id.as_str()) => {
                return false
            }
            _ => {}
        }

        if let Some(visible) = self.visible {
            if node.visible != visible {
                return false;
            }
        }

        self.property_equals
            .iter()
            .all(|(key, value)| node.properties.get(key) == Some(value))
    }
}
