//! Strict parsing of raw model output.
//!
//! No fence stripping and no partial parse: if the model ignored the prompt's
//! formatting rules, that surfaces here as `MalformedResponse`.

use serde_json::Value;

use lexigen_shared::{Result, VocabError};

/// Parse `raw` as a single JSON document whose top-level value is an object.
pub fn parse_response(raw: &str) -> Result<Value> {
    let document: Value = serde_json::from_str(raw)
        .map_err(|e| VocabError::malformed(format!("not valid JSON: {e}"), raw))?;

    if !document.is_object() {
        return Err(VocabError::malformed(
            format!("top-level value is {}, expected an object", json_type(&document)),
            raw,
        ));
    }

    Ok(document)
}

/// Human-readable JSON type name for diagnostics.
pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
