//! Prompt rendering for the completion service.
//!
//! Pure: the same request always renders the same prompt.

use lexigen_shared::{CategoryName, Formality, GenerationRequest, MIN_ENTRIES_PER_CATEGORY};

/// Fixed system instruction sent with every request.
pub const SYSTEM_PROMPT: &str = "You are a helpful language learning assistant that generates \
Spanish vocabulary lists in JSON format. Always respond with a single valid JSON object and \
nothing else.";

/// The system and user messages for one completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub system: &'static str,
    pub instruction: String,
}

/// Render the instruction for `request`.
pub fn build_prompt(request: &GenerationRequest) -> RenderedPrompt {
    let themes = request
        .categories()
        .iter()
        .map(CategoryName::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    let formality = Formality::ALL
        .iter()
        .map(Formality::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    let instruction = format!(
        "Generate a comprehensive list of Spanish vocabulary words related to the following themes: {themes}.\n\
         The output must be a JSON object where each key is one of the themes above, spelled exactly as given, \
         and its value is an array of vocabulary items.\n\
         Each vocabulary item in the array must be an object containing:\n\
         - spanish: the Spanish word\n\
         - english: the English translation\n\
         - parts: an object containing:\n\
         \x20 - category: the part of speech (noun, verb, adjective, etc.)\n\
         \x20 - type: subcategory or specific usage\n\
         \x20 - formality: one of {formality}\n\
         Generate at least {MIN_ENTRIES_PER_CATEGORY} relevant words for each theme.\n\
         Respond with the JSON object only: no markdown formatting, no code fences, \
         and no text before or after it."
    );

    RenderedPrompt {
        system: SYSTEM_PROMPT,
        instruction,
    }
}
