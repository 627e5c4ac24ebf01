//! Application state for API handlers.

use std::sync::Arc;

/// Shared application state.
///
/// Holds nothing mutable: every request runs its own pipeline against the
/// shared completion service.
pub struct AppState<S> {
    /// Completion service used by every request.
    pub service: Arc<S>,

    /// Server version reported by `/health`.
    pub version: &'static str,
}

impl<S> AppState<S> {
    pub fn new(service: S) -> Self {
        Self {
            service: Arc::new(service),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

// Manual impl: `S` itself need not be `Clone`.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            version: self.version,
        }
    }
}
