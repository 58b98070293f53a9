mod api_docs;
mod config;
mod controllers;
mod error;
mod models;
mod routes;
mod services;
mod shared_state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::services::upstream::HttpUpstream;
use crate::shared_state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Load configuration
    let config_path = std::env::var("AGRO_CONFIG").unwrap_or_else(|_| "config.json".to_string());
    let config = Config::load_or_default(&config_path)?;
    info!(
        path = %config_path,
        provider = ?config.energy.provider,
        timeout_secs = config.upstream.timeout_secs,
        "configuration loaded"
    );

    // 2. Upstream client (shared connection pool, mandatory timeout)
    let upstream = HttpUpstream::new(&config.upstream).context("failed to build upstream HTTP client")?;

    // 3. Router
    let static_dir = config.server.static_dir.clone();
    let server_port = config.server.port;
    let state = AppState::new(config, Arc::new(upstream));

    let app = routes::api_routes::app(state)
        .fallback_service(ServeDir::new(&static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // 4. Serve
    let addr = SocketAddr::from(([0, 0, 0, 0], server_port));
    info!("API Server listening on http://{}", addr);
    info!("Scalar UI: http://{}/scalar", addr);

    axum_server::bind(addr)
        .serve(app.into_make_service())
        .await
        .context("HTTP server stopped")?;
    Ok(())
}
