//! Schoolsite Core - page/menu tree and staff org chart
//!
//! This crate manages the hierarchical content of a school website: the pages,
//! links and containers that make up the navigation menu, and the staff
//! members that make up the organization chart. Both are stored as flat
//! records with a parent reference and a sibling order.
//!
//! # Architecture
//!
//! - **Universal Node**: one record type; kind-specific data lives in `properties`
//! - **Flat storage**: `parent_id` + `order`, forests are derived on read
//! - **Validated writes**: every hierarchy change goes through `NodeService`,
//!   which rejects self-parents and cycles before anything is written
//! - **Pluggable persistence**: `NodeStore` trait with in-memory and JSON file backends
//!
//! # Modules
//!
//! - [`models`] - Data structures (Node, PageNode, StaffNode, filters, updates)
//! - [`behaviors`] - Per-type validation rules
//! - [`tree`] - Forest building, cycle checks, flattening, menu projection
//! - [`services`] - `NodeService` business rules and domain events
//! - [`db`] - `NodeStore` trait and backends
//! - [`http`] - Admin JSON API (axum)
//! - [`config`] - `SiteConfig` loading and environment overrides
//! - [`logging`] - tracing subscriber setup for binaries
//! - [`utils`] - Slug derivation

pub mod behaviors;
pub mod config;
pub mod db;
pub mod http;
pub mod logging;
pub mod models;
pub mod services;
pub mod tree;
pub mod utils;

// Re-export commonly used types
pub use behaviors::*;
pub use models::*;
pub use services::*;
pub use tree::{build_forest, TreeNode};
