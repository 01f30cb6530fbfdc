//! Node CRUD and hierarchy endpoints
//!
//! # Endpoints
//!
//! - `GET /api/health` - Health check
//! - `GET /api/nodes?type=&parent=&visible=` - List nodes
//! - `POST /api/nodes` - Create a node
//! - `GET /api/nodes/:id` - Get a node
//! - `PATCH /api/nodes/:id` - Partial update
//! - `DELETE /api/nodes/:id?policy=` - Delete under an orphan policy
//! - `GET /api/nodes/:id/children` - Ordered children
//! - `POST /api/nodes/:id/move` - Re-parent and/or reposition
//! - `POST /api/nodes/:id/reorder` - Renumber children after drag-and-drop
//! - `GET /api/nodes/:id/parent-candidates` - Valid new parents for a picker
//! - `GET /api/nodes/:id/breadcrumbs` - Root-to-node path
//!
//! Wherever a path segment names a parent, `root` stands for the top level.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::config::OrphanPolicy;
use crate::http::{AppState, HttpError, ROOT_SEGMENT};
use crate::models::{DeleteResult, Node, NodeFilter, NodeUpdate};
use crate::services::CreateNodeParams;
use crate::tree::FlatEntry;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

/// Query parameters for `GET /api/nodes`
#[derive(Debug, Default, Deserialize)]
pub struct ListNodesQuery {
    #[serde(rename = "type")]
    node_type: Option<String>,
    /// Parent ID, or `root` for top-level nodes
    parent: Option<String>,
    visible: Option<bool>,
}

impl ListNodesQuery {
    fn into_filter(self) -> NodeFilter {
        let mut filter = NodeFilter::new();
        if let Some(node_type) = self.node_type {
            filter = filter.with_node_type(node_type);
        }
        filter = match self.parent.as_deref() {
            Some(ROOT_SEGMENT) => filter.roots_only(),
            Some(parent) => filter.with_parent_id(parent),
            None => filter,
        };
        if let Some(visible) = self.visible {
            filter = filter.with_visible(visible);
        }
        filter
    }
}

/// Query parameters for `DELETE /api/nodes/:id`
#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    /// Overrides the configured orphan policy for this request
    policy: Option<OrphanPolicy>,
}

/// Body of `POST /api/nodes/:id/move`
///
/// A missing or `null` `parentId` moves the node to the top level.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveNodeRequest {
    #[serde(default)]
    parent_id: Option<String>,
    #[serde(default)]
    order: Option<i64>,
}

/// Body of `POST /api/nodes/:id/reorder`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    child_ids: Vec<String>,
}

/// `root` path segment means "no parent"
fn parent_segment(id: &str) -> Option<&str> {
    (id != ROOT_SEGMENT).then_some(id)
}

/// Health check endpoint
///
/// ```bash
/// curl http://127.0.0.1:3000/api/health
/// ```
async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn list_nodes(
    State(state): State<AppState>,
    Query(query): Query<ListNodesQuery>,
) -> Result<Json<Vec<Node>>, HttpError> {
    let nodes = state.node_service.list_nodes(query.into_filter()).await?;
    Ok(Json(nodes))
}

/// Create a new node
///
/// ```bash
/// curl -X POST http://127.0.0.1:3000/api/nodes \
///   -H "Content-Type: application/json" \
///   -d '{"nodeType": "page", "title": "About Us", "properties": {"slug": "about-us"}}'
/// ```
async fn create_node(
    State(state): State<AppState>,
    Json(params): Json<CreateNodeParams>,
) -> Result<(StatusCode, Json<Node>), HttpError> {
    let node = state.node_service.create_node(params).await?;
    tracing::debug!(id = %node.id, "Created node via API");
    Ok((StatusCode::CREATED, Json(node)))
}

async fn get_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Node>, HttpError> {
    Ok(Json(state.node_service.require_node(&id).await?))
}

/// Update an existing node (partial update)
///
/// ```bash
/// curl -X PATCH http://127.0.0.1:3000/api/nodes/<id> \
///   -H "Content-Type: application/json" \
///   -d '{"title": "Admissions", "parentId": null}'
/// ```
async fn update_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<NodeUpdate>,
) -> Result<Json<Node>, HttpError> {
    let node = state.node_service.update_node(&id, update).await?;
    Ok(Json(node))
}

/// Delete a node
///
/// ```bash
/// curl -X DELETE "http://127.0.0.1:3000/api/nodes/<id>?policy=cascade"
/// ```
async fn delete_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<DeleteResult>, HttpError> {
    let result = match query.policy {
        Some(policy) => {
            state
                .node_service
                .delete_node_with_policy(&id, policy)
                .await?
        }
        None => state.node_service.delete_node(&id).await?,
    };
    Ok(Json(result))
}

async fn get_children(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Node>>, HttpError> {
    let children = state
        .node_service
        .get_children(parent_segment(&id))
        .await?;
    Ok(Json(children))
}

/// Re-parent and/or reposition a node
///
/// ```bash
/// curl -X POST http://127.0.0.1:3000/api/nodes/<id>/move \
///   -H "Content-Type: application/json" \
///   -d '{"parentId": "<new-parent>", "order": 0}'
/// ```
async fn move_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<MoveNodeRequest>,
) -> Result<Json<Node>, HttpError> {
    let node = state
        .node_service
        .move_node(&id, request.parent_id.as_deref(), request.order)
        .await?;
    Ok(Json(node))
}

/// Renumber children after a drag-and-drop
///
/// ```bash
/// curl -X POST http://127.0.0.1:3000/api/nodes/root/reorder \
///   -H "Content-Type: application/json" \
///   -d '{"childIds": ["home", "about", "contact"]}'
/// ```
async fn reorder_children(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ReorderRequest>,
) -> Result<Json<Vec<Node>>, HttpError> {
    let children = state
        .node_service
        .reorder_children(parent_segment(&id), request.child_ids)
        .await?;
    Ok(Json(children))
}

async fn parent_candidates(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<FlatEntry>>, HttpError> {
    Ok(Json(state.node_service.parent_candidates(&id).await?))
}

async fn breadcrumbs(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Node>>, HttpError> {
    Ok(Json(state.node_service.breadcrumbs(&id).await?))
}

/// Router with every node endpoint, merged by [`crate::http::create_router`]
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/nodes", get(list_nodes).post(create_node))
        .route(
            "/api/nodes/:id",
            get(get_node).patch(update_node).delete(delete_node),
        )
        .route("/api/nodes/:id/children", get(get_children))
        .route("/api/nodes/:id/move", post(move_node))
        .route("/api/nodes/:id/reorder", post(reorder_children))
        .route("/api/nodes/:id/parent-candidates", get(parent_candidates))
        .route("/api/nodes/:id/breadcrumbs", get(breadcrumbs))
        .with_state(state)
}
