//! End-to-end generation: categories → prompt → completion → parse → validate.
//!
//! Strictly linear. Each stage either hands its output to the next or ends the
//! request with a single [`VocabError`]; nothing is retried and nothing is
//! kept between calls.

use tracing::{debug, error, info, instrument, warn};

use lexigen_shared::{GenerationRequest, Result, VocabularyDictionary};

use crate::client::CompletionService;
use crate::normalize::normalize_categories;
use crate::parser::parse_response;
use crate::prompt::build_prompt;
use crate::validate::validate_document;

/// Run the full pipeline on raw caller input.
#[instrument(skip_all, fields(inputs = raw_categories.len()))]
pub async fn generate<S, C>(raw_categories: &[S], service: &C) -> Result<VocabularyDictionary>
where
    S: AsRef<str>,
    C: CompletionService,
{
    let request = normalize_categories(raw_categories).inspect_err(|e| {
        debug!(error = %e, "rejected category list");
    })?;

    generate_for(&request, service).await
}

/// Run the pipeline for an already-normalized request.
#[instrument(skip_all, fields(categories = request.len()))]
pub async fn generate_for<C>(request: &GenerationRequest, service: &C) -> Result<VocabularyDictionary>
where
    C: CompletionService,
{
    let prompt = build_prompt(request);
    debug!(chars = prompt.instruction.len(), "prompt rendered");

    let raw = service
        .complete(prompt.system, &prompt.instruction)
        .await
        .inspect_err(|e| warn!(kind = %e.kind(), error = %e, "completion failed"))?;
    debug!(chars = raw.len(), "completion received");

    let document = parse_response(&raw).inspect_err(|e| {
        error!(error = %e, raw = %raw, "model output is not a JSON object");
    })?;

    let dictionary = validate_document(document, request)
        .inspect_err(|e| warn!(kind = %e.kind(), error = %e, "model output failed validation"))?;

    info!(categories = request.len(), "vocabulary generated");
    Ok(dictionary)
}
