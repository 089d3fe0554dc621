//! pixcache server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use pixcache_client::TcpProbe;
use pixcache_core::{AppConfig, CacheDb, WatchMonitor};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod state;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    tracing::info!("Starting pixcache server on stdio transport: db={}", config.db_path.display());

    let db = Arc::new(CacheDb::open(&config.db_path).await.context("opening cache database")?);

    let monitor = WatchMonitor::new(true);
    let probe = match config.probe_interval() {
        Some(interval) => match TcpProbe::for_base_url(&config.api_base_url) {
            Ok(probe) => {
                probe.check_into(&monitor).await;
                Some(probe.spawn(monitor.clone(), interval))
            }
            Err(e) => {
                tracing::warn!("connectivity probe disabled: {}", e);
                None
            }
        },
        None => None,
    };

    let state = Arc::new(state::AppState::from_config(&config, db, monitor));
    let handler = handler::PixcacheServer::new(state);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    if let Some(probe) = probe {
        probe.abort();
    }

    Ok(())
}
