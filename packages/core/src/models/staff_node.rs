//! Type-Safe StaffNode Wrapper
//!
//! Staff members form the org chart: each member optionally reports to
//! another member through `parent_id`, and `order` positions them among
//! colleagues with the same manager.
//!
//! Only the canonical property names (`role`, `bio`, `photoUrl`) are read
//! here. Legacy aliases are rewritten by the persistence layer before a node
//! ever reaches this wrapper (see [`crate::db::legacy`]).

use crate::models::{Node, ValidationError};
use serde_json::{json, Value};

/// Node type string for staff members
pub const STAFF_NODE_TYPE: &str = "staff";

pub const ROLE_KEY: &str = "role";
pub const BIO_KEY: &str = "bio";
pub const PHOTO_URL_KEY: &str = "photoUrl";

/// Type-safe wrapper for staff nodes
pub struct StaffNode {
    node: Node,
}

impl StaffNode {
    /// Wrap a universal Node
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidNodeType` if node_type is not "staff"
    pub fn from_node(node: Node) -> Result<Self, ValidationError> {
        if node.node_type != STAFF_NODE_TYPE {
            return Err(ValidationError::InvalidNodeType(format!(
                "Expected node_type 'staff', got '{}'",
                node.node_type
            )));
        }
        Ok(Self { node })
    }

    /// Create a new staff member reporting to `manager_id`
    pub fn new(name: impl Into<String>, role: impl Into<String>, manager_id: Option<String>) -> Self {
        let role: String = role.into();
        let node = Node::new(STAFF_NODE_TYPE, name, manager_id, json!({ ROLE_KEY: role }));
        Self { node }
    }

    pub fn as_node(&self) -> &Node {
        &self.node
    }

    pub fn into_node(self) -> Node {
        self.node
    }

    pub fn name(&self) -> &str {
        &self.node.title
    }

    pub fn role(&self) -> Option<&str> {
        self.node.property_str(ROLE_KEY)
    }

    pub fn bio(&self) -> Option<&str> {
        self.node.property_str(BIO_KEY)
    }

    pub fn photo_url(&self) -> Option<&str> {
        self.node.property_str(PHOTO_URL_KEY)
    }

    /// Manager this member reports to
    pub fn manager_id(&self) -> Option<&str> {
        self.node.parent_id.as_deref()
    }

    pub fn set_role(&mut self, role: impl Into<String>) {
        self.node.set_property(ROLE_KEY, Value::String(role.into()));
    }

    pub fn set_bio(&mut self, bio: impl Into<String>) {
        self.node.set_property(BIO_KEY, Value::String(bio.into()));
    }

    pub fn set_photo_url(&mut self, url: impl Into<String>) {
        self.node
            .set_property(PHOTO_URL_KEY, Value::String(url.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_staff_member() {
        let mut principal = StaffNode::new("Ayşe Demir", "Principal", None);
        principal.set_bio("Twenty years in education.");
        principal.set_photo_url("https://cdn.example/ayse.jpg");

        assert_eq!(principal.name(), "Ayşe Demir");
        assert_eq!(principal.role(), Some("Principal"));
        assert_eq!(principal.bio(), Some("Twenty years in education."));
        assert_eq!(principal.photo_url(), Some("https://cdn.example/ayse.jpg"));
        assert_eq!(principal.manager_id(), None);
    }

    #[test]
    fn test_reports_to_manager() {
        let teacher = StaffNode::new("Mehmet", "Teacher", Some("principal-1".to_string()));
        assert_eq!(teacher.manager_id(), Some("principal-1"));
    }

    #[test]
    fn test_from_node_rejects_pages() {
        let node = Node::new("page", "Home", None, json!({"slug": "home"}));
        assert!(matches!(
            StaffNode::from_node(node),
            Err(ValidationError::InvalidNodeType(_))
        ));
    }
}
