use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;

pub mod academic_service;
pub mod auth;
pub mod auth_service;
pub mod config;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod routes;

/// Serve `app` on `listener` until Ctrl+C, finishing in-flight requests first
pub async fn serve_with_shutdown(listener: TcpListener, app: Router) -> Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received, draining connections"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for shutdown signal"),
    }
}
