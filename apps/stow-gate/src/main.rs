//! StowGate - Asset Upload Service
//!
//! HTTP front for Stowage asset ingestion. Validates uploads against the
//! configured policy and stores them in the local filesystem or an
//! S3-compatible object store, whichever the configuration selects at startup.

mod backend;
mod config;
mod dto;
mod handlers;
mod routes;

use anyhow::{Context, Result};
use std::sync::Arc;
use stowage_domain::IngestionService;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{backend::ActiveBackend, config::GatewayConfig};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub ingestion_service: Arc<IngestionService<ActiveBackend>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting StowGate upload service");

    let config = GatewayConfig::from_env().context("Invalid configuration")?;

    // Backend choice is fixed for the lifetime of the process
    let backend = ActiveBackend::from_policy(&config.policy)
        .await
        .context("Failed to initialize storage backend")?;

    let service = IngestionService::new(backend, config.policy.clone());

    // Create shared application state
    let state = AppState {
        ingestion_service: Arc::new(service),
    };

    // Build HTTP router
    let app = routes::create_router(state);

    let addr = config.bind_addr();
    info!(addr = %addr, "Starting HTTP server");

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
