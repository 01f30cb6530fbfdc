//! JsonFileStore - NodeStore backed by a single JSON document
//!
//! The whole collection lives in one file:
//!
//! ```json
//! { "version": 1, "nodes": [ { "id": "...", "nodeType": "page", ... } ] }
//! ```
//!
//! A bare top-level array (older exports) is accepted too. The file is read
//! once at open; each mutation is applied to a copy of the records, the copy
//! is written to `<file>.tmp` and renamed over the original, and only then
//! does the in-memory state switch over. A failed write leaves both the file
//! and the in-memory state as they were.

use crate::db::legacy::adapt_record;
use crate::db::memory_store::Records;
use crate::db::{DatabaseError, NodeStore, StoreResult};
use crate::models::{DeleteResult, Node, NodeUpdate};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Current document format version
pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Serialize)]
struct DocumentRef<'a> {
    version: u32,
    nodes: &'a [Node],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredDocument {
    Versioned {
        #[serde(default)]
        version: Option<u32>,
        nodes: Vec<Value>,
    },
    Bare(Vec<Value>),
}

/// File-backed NodeStore implementation
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    records: RwLock<Records>,
}

impl JsonFileStore {
    /// Open (or create) the document at `path`
    ///
    /// Legacy records are adapted on load; when any record needed adapting
    /// the file is rewritten in the current format straight away.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the file cannot be read, is not valid JSON,
    /// or contains records that cannot be adapted to a `Node`.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();

        let (nodes, adapted) = if fs::try_exists(&path)
            .await
            .map_err(|e| DatabaseError::io(&path, e))?
        {
            Self::load(&path).await?
        } else {
            info!(path = %path.display(), "Creating new site document");
            (Vec::new(), 1)
        };

        let (records, skipped) = Records::from_nodes(nodes);
        if !skipped.is_empty() {
            warn!(?skipped, "Ignoring duplicate node IDs in site document");
        }

        let store = Self {
            path,
            records: RwLock::new(records),
        };

        if adapted > 0 {
            let records = store.records.read().await;
            store.persist(&records).await?;
        }

        debug!(path = %store.path.display(), "Site document opened");
        Ok(store)
    }

    /// Location of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(path: &Path) -> StoreResult<(Vec<Node>, usize)> {
        let text = fs::read_to_string(path)
            .await
            .map_err(|e| DatabaseError::io(path, e))?;

        let document: StoredDocument = if text.trim().is_empty() {
            StoredDocument::Bare(Vec::new())
        } else {
            serde_json::from_str(&text).map_err(|e| DatabaseError::malformed(path, e.to_string()))?
        };

        let (raw, outdated) = match document {
            StoredDocument::Versioned { version, nodes } => {
                (nodes, version != Some(DOCUMENT_VERSION))
            }
            StoredDocument::Bare(nodes) => (nodes, true),
        };

        let mut adapted = usize::from(outdated);
        let mut nodes = Vec::with_capacity(raw.len());
        for (index, mut record) in raw.into_iter().enumerate() {
            if adapt_record(&mut record) {
                adapted += 1;
            }
            let node: Node = serde_json::from_value(record).map_err(|e| {
                DatabaseError::malformed(path, format!("record {}: {}", index, e))
            })?;
            nodes.push(node);
        }

        if adapted > 0 {
            warn!(
                path = %path.display(),
                adapted,
                "Adapted legacy records in site document"
            );
        }

        Ok((nodes, adapted))
    }

    /// Atomic write: serialize to a temp file, then rename over the document
    async fn persist(&self, records: &Records) -> StoreResult<()> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| DatabaseError::io(dir, e))?;
        }

        let nodes = records.to_vec();
        let serialized = serde_json::to_string_pretty(&DocumentRef {
            version: DOCUMENT_VERSION,
            nodes: &nodes,
        })?;

        let temp_path = temp_path_for(&self.path);
        fs::write(&temp_path, serialized)
            .await
            .map_err(|e| DatabaseError::io(&temp_path, e))?;
        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| DatabaseError::io(&self.path, e))?;

        Ok(())
    }

    /// Run `mutate` on a copy of the records and commit it once it is on disk
    async fn write_with<T, F>(&self, mutate: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Records) -> StoreResult<T> + Send,
        T: Send,
    {
        let mut guard = self.records.write().await;
        let mut next = guard.clone();
        let result = mutate(&mut next)?;
        self.persist(&next).await?;
        *guard = next;
        Ok(result)
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[async_trait]
impl NodeStore for JsonFileStore {
    async fn create_node(&self, node: Node) -> StoreResult<Node> {
        self.write_with(|records| records.insert(node)).await
    }

    async fn get_node(&self, id: &str) -> StoreResult<Option<Node>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn update_node(&self, id: &str, update: NodeUpdate) -> StoreResult<Node> {
        self.write_with(|records| records.update(id, &update)).await
    }

    async fn delete_node(&self, id: &str) -> StoreResult<DeleteResult> {
        if self.records.read().await.get(id).is_none() {
            return Ok(DeleteResult::not_found());
        }
        self.write_with(|records| Ok(records.remove(id))).await
    }

    async fn update_nodes(&self, updates: Vec<(String, NodeUpdate)>) -> StoreResult<Vec<Node>> {
        self.write_with(|records| records.update_many(&updates)).await
    }

    async fn delete_nodes(&self, ids: &[String]) -> StoreResult<Vec<String>> {
        self.write_with(|records| Ok(records.remove_many(ids))).await
    }

    async fn list_all(&self) -> StoreResult<Vec<Node>> {
        Ok(self.records.read().await.to_vec())
    }
}
