//! Category normalization: raw caller input → [`GenerationRequest`].

use lexigen_shared::{CategoryName, GenerationRequest, Result};

/// Split comma-joined input, trim each token, and drop blanks.
///
/// Order is preserved and nothing is deduplicated or case-folded.
/// Fails with `EmptyRequest` if no category survives.
pub fn normalize_categories<S: AsRef<str>>(raw: &[S]) -> Result<GenerationRequest> {
    let categories: Vec<CategoryName> = raw
        .iter()
        .flat_map(|item| item.as_ref().split(','))
        .filter_map(CategoryName::new)
        .collect();

    GenerationRequest::new(categories)
}
