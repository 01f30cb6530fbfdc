//! Node Behavior System
//!
//! This module provides the trait-based behavior system for different node types:
//!
//! - `NodeBehavior` trait - Defines type-specific validation
//! - Built-in behaviors (PageNodeBehavior, LinkNodeBehavior, ContainerNodeBehavior,
//!   StaffNodeBehavior)
//! - `NodeBehaviorRegistry` - Dynamic behavior lookup and registration
//!
//! Every write in `NodeService` runs `NodeBehaviorRegistry::validate_node`, so
//! a stored node always satisfies the rules of its declared type.

use crate::models::{
    Node, PageKind, ValidationError, BIO_KEY, HREF_KEY, PHOTO_URL_KEY, ROLE_KEY, SLUG_KEY,
    STAFF_NODE_TYPE,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Type-specific rules for one node type
pub trait NodeBehavior: Send + Sync {
    /// Node type string this behavior handles
    fn type_name(&self) -> &'static str;

    /// Check the type-specific fields of `node`
    ///
    /// Structural checks shared by all types (`Node::validate`) have already
    /// passed when this runs.
    fn validate(&self, node: &Node) -> Result<(), ValidationError>;

    /// Whether nodes of this type are addressed by a site-unique slug
    fn uses_slug(&self) -> bool {
        false
    }
}

/// Require a non-blank string property, naming the field when it is missing
fn require_text(node: &Node, key: &str) -> Result<(), ValidationError> {
    match node.property_str(key) {
        Some(value) if !value.trim().is_empty() => Ok(()),
        _ => Err(ValidationError::MissingField(key.to_string())),
    }
}

/// `page`: renderable content addressed by slug
pub struct PageNodeBehavior;

impl NodeBehavior for PageNodeBehavior {
    fn type_name(&self) -> &'static str {
        PageKind::Page.as_str()
    }

    fn validate(&self, node: &Node) -> Result<(), ValidationError> {
        require_text(node, SLUG_KEY)
    }

    fn uses_slug(&self) -> bool {
        true
    }
}

/// `link`: menu entry pointing at a URL
pub struct LinkNodeBehavior;

impl NodeBehavior for LinkNodeBehavior {
    fn type_name(&self) -> &'static str {
        PageKind::Link.as_str()
    }

    fn validate(&self, node: &Node) -> Result<(), ValidationError> {
        require_text(node, HREF_KEY)
    }
}

/// `container`: grouping entry, no type-specific requirements
pub struct ContainerNodeBehavior;

impl NodeBehavior for ContainerNodeBehavior {
    fn type_name(&self) -> &'static str {
        PageKind::Container.as_str()
    }

    fn validate(&self, _node: &Node) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// `staff`: org chart member; optional fields must be strings when present
pub struct StaffNodeBehavior;

impl NodeBehavior for StaffNodeBehavior {
    fn type_name(&self) -> &'static str {
        STAFF_NODE_TYPE
    }

    fn validate(&self, node: &Node) -> Result<(), ValidationError> {
        for key in [ROLE_KEY, BIO_KEY, PHOTO_URL_KEY] {
            match node.properties.get(key) {
                None | Some(serde_json::Value::String(_)) => {}
                Some(_) => {
                    return Err(ValidationError::InvalidProperties(format!(
                        "'{}' must be a string",
                        key
                    )))
                }
            }
        }
        Ok(())
    }
}

/// Lookup table from node type to behavior
pub struct NodeBehaviorRegistry {
    behaviors: HashMap<&'static str, Arc<dyn NodeBehavior>>,
}

impl NodeBehaviorRegistry {
    /// Registry with the built-in page, link, container and staff behaviors
    pub fn new() -> Self {
        let mut registry = Self {
            behaviors: HashMap::new(),
        };
        registry.register(Arc::new(PageNodeBehavior));
        registry.register(Arc::new(LinkNodeBehavior));
        registry.register(Arc::new(ContainerNodeBehavior));
        registry.register(Arc::new(StaffNodeBehavior));
        registry
    }

    /// Add or replace the behavior for its type
    pub fn register(&mut self, behavior: Arc<dyn NodeBehavior>) {
        self.behaviors.insert(behavior.type_name(), behavior);
    }

    pub fn get(&self, node_type: &str) -> Option<&Arc<dyn NodeBehavior>> {
        self.behaviors.get(node_type)
    }

    /// Registered type names, sorted
    pub fn node_types(&self) -> Vec<&'static str> {
        let mut types: Vec<_> = self.behaviors.keys().copied().collect();
        types.sort_unstable();
        types
    }

    /// Structural plus type-specific validation
    ///
    /// # Errors
    ///
    /// - `InvalidNodeType` for unregistered types
    /// - whatever `Node::validate` or the type's behavior reports
    pub fn validate_node(&self, node: &Node) -> Result<(), ValidationError> {
        node.validate()?;
        let behavior = self.get(&node.node_type).ok_or_else(|| {
            ValidationError::InvalidNodeType(format!(
                "Unknown node type '{}'; expected one of {}",
                node.node_type,
                self.node_types().join(", ")
            ))
        })?;
        behavior.validate(node)
    }

    /// Whether `node_type` takes part in slug uniqueness
    pub fn uses_slug(&self, node_type: &str) -> bool {
        self.get(node_type).is_some_and(|b| b.uses_slug())
    }
}

impl Default for NodeBehaviorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> NodeBehaviorRegistry {
        NodeBehaviorRegistry::new()
    }

    #[test]
    fn test_page_requires_slug() {
        let page = Node::new("page", "About", None, json!({}));
        let err = registry().validate_node(&page).unwrap_err();

        assert_eq!(err, ValidationError::MissingField("slug".to_string()));
        assert_eq!(err.field(), Some("slug"));

        let blank = Node::new("page", "About", None, json!({"slug": "  "}));
        assert!(registry().validate_node(&blank).is_err());

        let ok = Node::new("page", "About", None, json!({"slug": "about"}));
        assert!(registry().validate_node(&ok).is_ok());
    }

    #[test]
    fn test_link_requires_href() {
        let link = Node::new("link", "Portal", None, json!({"slug": "portal"}));
        let err = registry().validate_node(&link).unwrap_err();

        assert_eq!(err.field(), Some("href"));
    }

    #[test]
    fn test_container_requires_nothing() {
        let group = Node::new("container", "School Life", None, json!({}));
        assert!(registry().validate_node(&group).is_ok());
    }

    #[test]
    fn test_staff_fields_must_be_strings() {
        let ok = Node::new("staff", "Jane", None, json!({"role": "Teacher"}));
        assert!(registry().validate_node(&ok).is_ok());

        let bad = Node::new("staff", "Jane", None, json!({"role": 3}));
        assert!(matches!(
            registry().validate_node(&bad),
            Err(ValidationError::InvalidProperties(_))
        ));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let node = Node::new("calendar", "Events", None, json!({}));
        assert!(matches!(
            registry().validate_node(&node),
            Err(ValidationError::InvalidNodeType(_))
        ));
    }

    #[test]
    fn test_structural_checks_run_first() {
        let node = Node::new("page", "", None, json!({}));
        assert_eq!(
            registry().validate_node(&node),
            Err(ValidationError::MissingField("title".to_string()))
        );
    }

    #[test]
    fn test_uses_slug_only_for_pages() {
        let registry = registry();
        assert!(registry.uses_slug("page"));
        assert!(!registry.uses_slug("link"));
        assert!(!registry.uses_slug("unknown"));
        assert_eq!(registry.node_types(), ["container", "link", "page", "staff"]);
    }
}
