//! Main HTTP Gateway Server.

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, instrument};

use incident_core::CompletionProvider;

use crate::{export_api, form_page, health_api, relay};

/// Application state shared across routes.
///
/// The provider is built once at startup and lives for the whole process.
#[derive(Clone)]
pub struct GatewayState {
    pub provider: Arc<dyn CompletionProvider>,
    pub started_at: Instant,
}

impl GatewayState {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            started_at: Instant::now(),
        }
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(form_page::index))
        .route("/api/generate-report", post(relay::generate_report))
        .route("/api/export-pdf", post(export_api::export_pdf))
        .route("/api/health", get(health_api::get_health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves until the process stops.
#[instrument(skip(state))]
pub async fn start_server(addr: SocketAddr, state: GatewayState) -> Result<()> {
    let listener = TcpListener::bind(&addr).await?;
    serve(listener, state).await
}

/// Serves on an already bound listener.
pub async fn serve(listener: TcpListener, state: GatewayState) -> Result<()> {
    let app = build_router(state);
    info!(addr = %listener.local_addr()?, "Incident report gateway listening");
    axum::serve(listener, app).await?;
    Ok(())
}
