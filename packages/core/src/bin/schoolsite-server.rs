//! Schoolsite Admin Server Binary
//!
//! Loads the site configuration, opens the JSON node document and serves the
//! admin API.
//!
//! # Usage
//!
//! ```bash
//! # Defaults: ./schoolsite.json config, data/site.json, 127.0.0.1:3000
//! cargo run --bin schoolsite-server
//!
//! # Custom data file and address
//! SCHOOLSITE_DATA_PATH=/srv/school/site.json \
//! SCHOOLSITE_BIND_ADDR=0.0.0.0:8080 cargo run --bin schoolsite-server
//! ```
//!
//! # Environment Variables
//!
//! - `SCHOOLSITE_CONFIG`: Config file path (default: `schoolsite.json`)
//! - `SCHOOLSITE_DATA_PATH`: Node document path, overrides the config file
//! - `SCHOOLSITE_BIND_ADDR`: Listen address, overrides the config file
//! - `RUST_LOG`: Logging filter (e.g. "info", "schoolsite_core=debug")

use std::env;
use std::sync::Arc;

use anyhow::Context;
use schoolsite_core::config::SiteConfig;
use schoolsite_core::db::{JsonFileStore, NodeStore};
use schoolsite_core::http::start_server;
use schoolsite_core::logging::init_logging;
use schoolsite_core::services::NodeService;

const CONFIG_PATH_ENV: &str = "SCHOOLSITE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "schoolsite.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config_path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = SiteConfig::load(&config_path)
        .await
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    tracing::info!(
        config = %config_path,
        data = %config.data_path.display(),
        orphan_policy = ?config.orphan_policy,
        "Starting schoolsite admin server"
    );

    let store = JsonFileStore::open(config.data_path.clone())
        .await
        .with_context(|| format!("Failed to open node document {}", config.data_path.display()))?;
    tracing::info!(nodes = store.list_all().await?.len(), "Node document loaded");

    let bind_addr = config.bind_addr.clone();
    let service = NodeService::with_config(Arc::new(store), config);

    start_server(service, &bind_addr)
        .await
        .with_context(|| format!("Admin API failed on {}", bind_addr))?;

    tracing::info!("Server stopped");
    Ok(())
}
