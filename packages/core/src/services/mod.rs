//! Business Services
//!
//! - `NodeService` - validated CRUD, hierarchy moves, delete policies and
//!   tree/menu projections over any `NodeStore`
//!
//! Services coordinate between the persistence layer and the HTTP surface,
//! implementing the rules the stores do not know about.

pub mod error;
pub mod node_service;

pub use error::NodeServiceError;
pub use node_service::{CreateNodeParams, NodeService};
