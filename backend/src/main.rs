// main.rs

mod config;
mod producer;
mod state;
mod web;

use crate::config::load_config;
use crate::state::AppState;
use anyhow::Context;
use axum::Router;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = load_config()?;
    info!(
        devices = ?config.devices,
        tick_ms = config.tick_ms,
        seeded = config.seed.is_some(),
        "starting telemetry producer"
    );

    // --- Shared state ---
    let state = Arc::new(AppState::new(config));

    // --- Webserver ---
    let app: Router = web::router(state.clone());

    let addr = state.config.bind_addr.clone();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal(state: Arc<AppState>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {e}");
        // Without a signal handler, run until killed.
        std::future::pending::<()>().await;
    }
    info!(
        clients = state.connected_clients(),
        "shutdown requested, closing sessions"
    );
    state.shutdown();
}
