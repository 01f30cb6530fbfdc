//! Data Models
//!
//! - `Node` - Universal record for pages, links, containers and staff members
//! - `PageNode` / `StaffNode` - Typed wrappers over `Node` properties
//!
//! Type-specific data lives in the `properties` field of `Node`.

mod node;
mod page_node;
mod staff_node;

pub use node::{DeleteResult, Node, NodeFilter, NodeUpdate, ParentFilter, ValidationError};
pub use page_node::{PageKind, PageNode, PageNodeBuilder, CONTENT_KEY, HREF_KEY, SLUG_KEY};
pub use staff_node::{StaffNode, BIO_KEY, PHOTO_URL_KEY, ROLE_KEY, STAFF_NODE_TYPE};
