//! Schema validation of a parsed model response.
//!
//! A predicate plus passthrough: the document is either returned unchanged as
//! a [`VocabularyDictionary`] or rejected with the first violation found, in
//! category-request order and then entry order. Extra entry fields and
//! unrequested top-level keys are tolerated.

use serde_json::{Map, Value};
use tracing::warn;

use lexigen_shared::{
    Formality, GenerationRequest, MIN_ENTRIES_PER_CATEGORY, Result, VocabError,
    VocabularyDictionary,
};

use crate::parser::json_type;

/// Validate `document` against the vocabulary contract for `request`.
pub fn validate_document(document: Value, request: &GenerationRequest) -> Result<VocabularyDictionary> {
    let map = match document {
        Value::Object(map) => map,
        other => {
            return Err(VocabError::malformed(
                format!("top-level value is {}, expected an object", json_type(&other)),
                other.to_string(),
            ));
        }
    };

    for category in request.categories() {
        let category = category.as_str();

        let entries = map
            .get(category)
            .and_then(Value::as_array)
            .ok_or_else(|| VocabError::IncompleteResponse {
                category: category.to_string(),
            })?;

        if entries.len() < MIN_ENTRIES_PER_CATEGORY {
            return Err(VocabError::InsufficientEntries {
                category: category.to_string(),
                count: entries.len(),
            });
        }

        for (index, entry) in entries.iter().enumerate() {
            validate_entry(category, index, entry)?;
        }
    }

    Ok(VocabularyDictionary::from_map(map))
}

fn validate_entry(category: &str, index: usize, entry: &Value) -> Result<()> {
    let Some(entry) = entry.as_object() else {
        return Err(VocabError::invalid_entry(
            category,
            index,
            "entry",
            format!("is {}, expected an object", json_type(entry)),
        ));
    };

    require_text(entry, "spanish", category, index, "spanish")?;
    require_text(entry, "english", category, index, "english")?;

    let parts = entry
        .get("parts")
        .and_then(Value::as_object)
        .ok_or_else(|| {
            VocabError::invalid_entry(category, index, "parts", "is missing or not an object")
        })?;

    require_text(parts, "category", category, index, "parts.category")?;
    require_text(parts, "type", category, index, "parts.type")?;
    let formality = require_text(parts, "formality", category, index, "parts.formality")?;

    if Formality::parse(formality).is_none() {
        warn!(category, index, formality, "unrecognized formality value");
        return Err(VocabError::invalid_entry(
            category,
            index,
            "parts.formality",
            "must be one of formal, informal, neutral",
        ));
    }

    Ok(())
}

/// Fetch `key` from `obj` as a non-blank string.
fn require_text<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    category: &str,
    index: usize,
    field: &str,
) -> Result<&'a str> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s),
        Some(Value::String(_)) => Err(VocabError::invalid_entry(category, index, field, "is empty")),
        Some(other) => Err(VocabError::invalid_entry(
            category,
            index,
            field,
            format!("is {}, expected a string", json_type(other)),
        )),
        None => Err(VocabError::invalid_entry(category, index, field, "is missing")),
    }
}
