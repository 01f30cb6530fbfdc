//! Database Layer
//!
//! Persistence for the node collection behind the `NodeStore` trait:
//!
//! - `InMemoryStore` - volatile backend for tests and previews
//! - `JsonFileStore` - single JSON document, rewritten atomically per write
//! - `legacy` - adaptation of flat records from older site exports
//! - `events` - domain events broadcast by the service layer
//!
//! Stores apply writes atomically per call and leave every hierarchy rule to
//! `NodeService`.

mod error;
pub mod events;
mod json_file_store;
pub mod legacy;
mod memory_store;
mod node_store;

pub use error::DatabaseError;
pub use events::DomainEvent;
pub use json_file_store::{JsonFileStore, DOCUMENT_VERSION};
pub use memory_store::InMemoryStore;
pub use node_store::{NodeStore, StoreResult};
