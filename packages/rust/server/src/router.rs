//! API router configuration.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use lexigen_generator::CompletionService;

use crate::handlers;
use crate::state::AppState;

/// Create the main API router.
pub fn create_router<S>(state: AppState<S>) -> Router
where
    S: CompletionService + 'static,
{
    Router::new()
        .route("/health", get(handlers::health::<S>))
        .route("/api/generate", post(handlers::generate_vocabulary::<S>))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
