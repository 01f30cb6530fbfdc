//! Tree, menu and slug endpoints
//!
//! - `GET /api/tree?type=` - Ordered forest (`staff` for the org chart,
//!   page-tree kinds by default)
//! - `GET /api/menu` - Navigation menu with the configured hidden-node policy
//! - `GET /api/slug?title=&exclude=` - Unique slug suggestion

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use crate::http::{AppState, HttpError};
use crate::models::{NodeFilter, STAFF_NODE_TYPE};
use crate::tree::{MenuItem, TreeNode};

#[derive(Debug, Default, Deserialize)]
pub struct TreeQuery {
    #[serde(rename = "type")]
    node_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SlugQuery {
    title: String,
    /// Page being edited; its own slug is not a collision
    exclude: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SlugSuggestion {
    pub slug: String,
}

async fn get_tree(
    State(state): State<AppState>,
    Query(query): Query<TreeQuery>,
) -> Result<Json<Vec<TreeNode>>, HttpError> {
    let service = &state.node_service;
    let forest = match query.node_type.as_deref() {
        None => service.page_forest().await?,
        Some(STAFF_NODE_TYPE) => service.org_chart().await?,
        Some(node_type) => {
            service
                .forest(NodeFilter::new().with_node_type(node_type))
                .await?
        }
    };
    Ok(Json(forest))
}

async fn get_menu(State(state): State<AppState>) -> Result<Json<Vec<MenuItem>>, HttpError> {
    Ok(Json(state.node_service.menu_items().await?))
}

/// Suggest a unique slug for a page title
///
/// ```bash
/// curl "http://127.0.0.1:3000/api/slug?title=Okul%20Bah%C3%A7esi"
/// ```
async fn suggest_slug(
    State(state): State<AppState>,
    Query(query): Query<SlugQuery>,
) -> Result<Json<SlugSuggestion>, HttpError> {
    let slug = state
        .node_service
        .suggest_slug(&query.title, query.exclude.as_deref())
        .await?;
    Ok(Json(SlugSuggestion { slug }))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/tree", get(get_tree))
        .route("/api/menu", get(get_menu))
        .route("/api/slug", get(suggest_slug))
        .with_state(state)
}
