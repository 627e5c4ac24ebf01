//! Request handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};

use lexigen_generator::{CompletionService, generate};
use lexigen_shared::VocabularyDictionary;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Body of `POST /api/generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateBody {
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Health check endpoint.
pub async fn health<S: Send + Sync + 'static>(State(state): State<AppState<S>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: state.version,
    })
}

/// Generate a vocabulary dictionary for the requested categories.
pub async fn generate_vocabulary<S>(
    State(state): State<AppState<S>>,
    payload: Result<Json<GenerateBody>, JsonRejection>,
) -> ApiResult<Json<VocabularyDictionary>>
where
    S: CompletionService + 'static,
{
    let Json(body) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let dictionary = generate(&body.categories, state.service.as_ref()).await?;

    Ok(Json(dictionary))
}
