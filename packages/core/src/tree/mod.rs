//! Hierarchy algorithms over flat node lists
//!
//! - `forest` - Flat list to ordered forest (`build_forest`)
//! - `hierarchy` - Ancestry queries: cycle checks, subtrees, breadcrumbs
//! - `flatten` - Depth-annotated pre-order listing
//! - `menu` - Visibility projection for the public navigation menu
//!
//! Everything here is synchronous and pure; callers fetch a snapshot from a
//! `NodeStore` first.

mod flatten;
mod forest;
mod hierarchy;
mod menu;

pub use flatten::{flatten, FlatEntry};
pub use forest::{build_forest, forest_size, TreeNode};
pub use hierarchy::{
    breadcrumbs, descendant_ids, is_descendant, Hierarchy, DEFAULT_WALK_LIMIT,
};
pub use menu::{menu_forest, to_menu_items, HiddenNodePolicy, MenuItem};
