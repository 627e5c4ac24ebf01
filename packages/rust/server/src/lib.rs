//! HTTP surface for vocabulary generation.
//!
//! Exposes `POST /api/generate` (body `{ "categories": [...] }`) and
//! `GET /health`. Errors are returned as `{ "error": text }`.

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

use std::net::SocketAddr;

use tracing::info;

use lexigen_generator::CompletionService;

pub use error::{ApiError, ApiResult, ErrorResponse, ServerError};
pub use router::create_router;
pub use state::AppState;

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve<S>(addr: SocketAddr, service: S) -> Result<(), ServerError>
where
    S: CompletionService + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    let local = listener.local_addr()?;
    info!(addr = %local, "vocabulary server listening");

    axum::serve(listener, create_router(AppState::new(service)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("vocabulary server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
