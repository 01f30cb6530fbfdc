//! Type-Safe PageNode Wrapper
//!
//! Menu entries come in three kinds that share the universal `Node` storage:
//!
//! - `page`: owns renderable HTML content, addressed by a unique slug
//! - `link`: points at an internal or external URL
//! - `container`: groups children in the menu, has no target of its own
//!
//! # Examples
//!
//! ```rust
//! use schoolsite_core::models::{PageKind, PageNode};
//!
//! let page = PageNode::builder(PageKind::Page, "Admissions")
//!     .with_slug("admissions")
//!     .with_content("<h1>Admissions</h1>")
//!     .build();
//!
//! assert_eq!(page.kind(), PageKind::Page);
//! assert_eq!(page.slug(), Some("admissions"));
//!
//! let node = page.into_node();
//! assert_eq!(node.node_type, "page");
//! ```

use crate::models::{Node, ValidationError};
use serde_json::{json, Value};
use std::str::FromStr;

/// Property key holding a page's URL slug
pub const SLUG_KEY: &str = "slug";
/// Property key holding a link's target URL
pub const HREF_KEY: &str = "href";
/// Property key holding a page's HTML body
pub const CONTENT_KEY: &str = "content";

/// Menu entry kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// Renderable page with slug and content
    Page,
    /// External or internal URL
    Link,
    /// Grouping node without a navigable target
    Container,
}

impl PageKind {
    /// Every page-tree node type, in declaration order
    pub const ALL: [PageKind; 3] = [PageKind::Page, PageKind::Link, PageKind::Container];

    /// Node type string stored in `Node::node_type`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Link => "link",
            Self::Container => "container",
        }
    }

    /// Node type strings for all page-tree kinds
    pub fn node_types() -> [&'static str; 3] {
        Self::ALL.map(|kind| kind.as_str())
    }

    /// Property keys that carry meaning for this kind
    pub fn owned_keys(&self) -> &'static [&'static str] {
        match self {
            Self::Page => &[SLUG_KEY, CONTENT_KEY],
            Self::Link => &[HREF_KEY],
            Self::Container => &[],
        }
    }

    /// Property keys owned by other kinds, stale once a node becomes `self`
    pub fn stale_keys(&self) -> Vec<&'static str> {
        [SLUG_KEY, HREF_KEY, CONTENT_KEY]
            .into_iter()
            .filter(|key| !self.owned_keys().contains(key))
            .collect()
    }
}

impl FromStr for PageKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "page" => Ok(Self::Page),
            "link" => Ok(Self::Link),
            "container" => Ok(Self::Container),
            other => Err(ValidationError::InvalidNodeType(format!(
                "Expected one of page, link, container; got '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for PageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-safe wrapper for page-tree nodes
pub struct PageNode {
    node: Node,
    kind: PageKind,
}

impl PageNode {
    /// Wrap a universal Node
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidNodeType` if the node type is not a
    /// page kind.
    pub fn from_node(node: Node) -> Result<Self, ValidationError> {
        let kind = node.node_type.parse()?;
        Ok(Self { node, kind })
    }

    /// Start building a new page-tree node
    pub fn builder(kind: PageKind, title: impl Into<String>) -> PageNodeBuilder {
        PageNodeBuilder {
            kind,
            title: title.into(),
            parent_id: None,
            order: 0,
            visible: true,
            properties: json!({}),
        }
    }

    /// Get reference to underlying universal Node
    pub fn as_node(&self) -> &Node {
        &self.node
    }

    /// Convert back to universal Node (consumes wrapper)
    pub fn into_node(self) -> Node {
        self.node
    }

    pub fn kind(&self) -> PageKind {
        self.kind
    }

    /// Slug, only meaningful for `page`
    pub fn slug(&self) -> Option<&str> {
        match self.kind {
            PageKind::Page => self.node.property_str(SLUG_KEY),
            _ => None,
        }
    }

    /// Target URL, only meaningful for `link`
    pub fn href(&self) -> Option<&str> {
        match self.kind {
            PageKind::Link => self.node.property_str(HREF_KEY),
            _ => None,
        }
    }

    /// HTML body, only meaningful for `page`
    pub fn content(&self) -> Option<&str> {
        match self.kind {
            PageKind::Page => self.node.property_str(CONTENT_KEY),
            _ => None,
        }
    }

    pub fn show_in_menu(&self) -> bool {
        self.node.visible
    }

    /// Path a menu renderer should link to
    ///
    /// Pages resolve to `/{slug}`, links to their href, containers to nothing.
    pub fn target(&self) -> Option<String> {
        match self.kind {
            PageKind::Page => self.slug().map(|slug| format!("/{}", slug)),
            PageKind::Link => self.href().map(str::to_string),
            PageKind::Container => None,
        }
    }

    pub fn set_slug(&mut self, slug: impl Into<String>) {
        self.node.set_property(SLUG_KEY, Value::String(slug.into()));
    }

    pub fn set_href(&mut self, href: impl Into<String>) {
        self.node.set_property(HREF_KEY, Value::String(href.into()));
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.node
            .set_property(CONTENT_KEY, Value::String(content.into()));
    }

    /// Switch kind, dropping fields that only the previous kind used
    pub fn set_kind(&mut self, kind: PageKind) {
        self.kind = kind;
        self.node.node_type = kind.as_str().to_string();
        for key in kind.stale_keys() {
            self.node.remove_property(key);
        }
    }
}

/// Builder for [`PageNode`]
pub struct PageNodeBuilder {
    kind: PageKind,
    title: String,
    parent_id: Option<String>,
    order: i64,
    visible: bool,
    properties: Value,
}

impl PageNodeBuilder {
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_slug(self, slug: impl Into<String>) -> Self {
        self.with_property(SLUG_KEY, slug.into())
    }

    pub fn with_href(self, href: impl Into<String>) -> Self {
        self.with_property(HREF_KEY, href.into())
    }

    pub fn with_content(self, content: impl Into<String>) -> Self {
        self.with_property(CONTENT_KEY, content.into())
    }

    fn with_property(mut self, key: &str, value: String) -> Self {
        if let Some(obj) = self.properties.as_object_mut() {
            obj.insert(key.to_string(), Value::String(value));
        }
        self
    }

    pub fn build(self) -> PageNode {
        let node = Node::new(self.kind.as_str(), self.title, self.parent_id, self.properties)
            .with_order(self.order)
            .with_visible(self.visible);
        PageNode {
            node,
            kind: self.kind,
        }
    }
}
