//! Admin JSON API
//!
//! An axum router over a shared [`NodeService`]. The API is unauthenticated;
//! put it behind the site's session gate or bind it to localhost.
//!
//! Endpoint groups live in their own modules and are merged here:
//! - `node_endpoints`: node CRUD, moves, reorders, parent candidates
//! - `tree_endpoints`: forests, the navigation menu, slug suggestions

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::services::NodeService;

mod error;
mod node_endpoints;
mod tree_endpoints;

pub use error::HttpError;

/// Path segment that stands for "top level" where a parent ID is expected
pub const ROOT_SEGMENT: &str = "root";

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub node_service: NodeService,
}

/// Build the admin router with request tracing
pub fn create_router(node_service: NodeService) -> Router {
    let state = AppState { node_service };

    Router::new()
        .merge(node_endpoints::routes(state.clone()))
        .merge(tree_endpoints::routes(state))
        .layer(TraceLayer::new_for_http())
}

/// Serve the admin API on `bind_addr` until Ctrl-C
pub async fn start_server(node_service: NodeService, bind_addr: &str) -> std::io::Result<()> {
    let app = create_router(node_service);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Admin API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}
