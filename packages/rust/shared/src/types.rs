//! Core domain types for vocabulary generation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, VocabError};

/// Minimum number of vocabulary entries the model must return per category.
pub const MIN_ENTRIES_PER_CATEGORY: usize = 5;

// ---------------------------------------------------------------------------
// CategoryName
// ---------------------------------------------------------------------------

/// A caller-supplied thematic label, trimmed and guaranteed non-empty.
///
/// Labels are kept verbatim (no case folding) because the model's output keys
/// must match them exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CategoryName(String);

impl CategoryName {
    /// Trim `raw`; returns `None` if nothing is left.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// GenerationRequest
// ---------------------------------------------------------------------------

/// The categories for one pipeline invocation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    categories: Vec<CategoryName>,
}

impl GenerationRequest {
    /// Build a request; fails with [`VocabError::EmptyRequest`] if `categories` is empty.
    pub fn new(categories: Vec<CategoryName>) -> Result<Self> {
        if categories.is_empty() {
            return Err(VocabError::EmptyRequest);
        }
        Ok(Self { categories })
    }

    /// Categories in first-seen order, duplicates included.
    pub fn categories(&self) -> &[CategoryName] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Always `false` for a constructed request; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

// ---------------------------------------------------------------------------
// VocabularyEntry
// ---------------------------------------------------------------------------

/// Register of a vocabulary item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Formality {
    Formal,
    Informal,
    Neutral,
}

impl Formality {
    /// All accepted values, in the order they are presented to the model.
    pub const ALL: [Formality; 3] = [Self::Formal, Self::Informal, Self::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Formal => "formal",
            Self::Informal => "informal",
            Self::Neutral => "neutral",
        }
    }

    /// Exact, case-sensitive match against the accepted values.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == s)
    }
}

impl std::fmt::Display for Formality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lexical metadata attached to a vocabulary entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryParts {
    /// Part of speech (noun, verb, adjective, ...).
    pub category: String,
    /// Subcategory or specific usage.
    #[serde(rename = "type")]
    pub kind: String,
    pub formality: Formality,
    /// Any additional fields the model emitted.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One Spanish/English word pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub spanish: String,
    pub english: String,
    pub parts: EntryParts,
    /// Any additional fields the model emitted.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// VocabularyDictionary
// ---------------------------------------------------------------------------

/// A validated model response: category name → array of vocabulary entries.
///
/// Wraps the parsed document as-is so that validation never rewrites what the
/// model returned. Key order follows the model's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VocabularyDictionary(Map<String, Value>);

impl VocabularyDictionary {
    /// Wrap an already-validated document.
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    /// Category keys in document order (may include unrequested extras).
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Typed entries for `category`, or `None` if the key is absent or its
    /// value does not deserialize into entries.
    pub fn entries(&self, category: &str) -> Option<Vec<VocabularyEntry>> {
        let value = self.0.get(category)?;
        Vec::<VocabularyEntry>::deserialize(value).ok()
    }

    /// Pretty-printed JSON, as shown to users.
    pub fn to_pretty_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.0)
            .map_err(|e| VocabError::config(format!("failed to serialize dictionary: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_name_trims() {
        let name = CategoryName::new("  food ").unwrap();
        assert_eq!(name.as_str(), "food");
        assert!(CategoryName::new("   ").is_none());
        assert!(CategoryName::new("").is_none());
    }

    #[test]
    fn category_name_keeps_case() {
        let a = CategoryName::new("Food").unwrap();
        let b = CategoryName::new("food").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn empty_generation_request_rejected() {
        let err = GenerationRequest::new(Vec::new()).unwrap_err();
        assert!(matches!(err, VocabError::EmptyRequest));
    }

    #[test]
    fn formality_parse_is_exact() {
        assert_eq!(Formality::parse("formal"), Some(Formality::Formal));
        assert_eq!(Formality::parse("neutral"), Some(Formality::Neutral));
        assert_eq!(Formality::parse("Formal"), None);
        assert_eq!(Formality::parse("casual"), None);
    }

    #[test]
    fn entry_deserializes_with_type_rename_and_extras() {
        let json = r#"{
            "spanish": "manzana",
            "english": "apple",
            "parts": {"category": "noun", "type": "fruit", "formality": "neutral", "gender": "f"},
            "example": "Como una manzana."
        }"#;
        let entry: VocabularyEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.parts.kind, "fruit");
        assert_eq!(entry.parts.formality, Formality::Neutral);
        assert_eq!(entry.parts.extra["gender"], "f");
        assert_eq!(entry.extra["example"], "Como una manzana.");

        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back["parts"]["type"], "fruit");
        assert_eq!(back["example"], "Como una manzana.");
    }

    #[test]
    fn dictionary_typed_entries() {
        let value = serde_json::json!({
            "food": [
                {"spanish": "pan", "english": "bread",
                 "parts": {"category": "noun", "type": "staple", "formality": "neutral"}}
            ],
            "notes": "not a list"
        });
        let dict: VocabularyDictionary = serde_json::from_value(value).unwrap();
        let food = dict.entries("food").unwrap();
        assert_eq!(food.len(), 1);
        assert_eq!(food[0].english, "bread");
        assert!(dict.entries("notes").is_none());
        assert!(dict.entries("colors").is_none());
        assert_eq!(dict.categories().collect::<Vec<_>>(), vec!["food", "notes"]);
    }
}
