//! Shared types, error model, and configuration for Lexigen.
//!
//! This crate is the foundation depended on by all other Lexigen crates.
//! It provides:
//! - [`VocabError`] - the unified error type and its [`ErrorKind`] tags
//! - Domain types ([`CategoryName`], [`GenerationRequest`], [`VocabularyEntry`],
//!   [`VocabularyDictionary`])
//! - Configuration ([`AppConfig`], [`GenerationSettings`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, GenerationConfig, GenerationSettings, ServerConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, resolve_api_key, validate_api_key,
};
pub use error::{ErrorKind, Result, VocabError};
pub use types::{
    CategoryName, EntryParts, Formality, GenerationRequest, MIN_ENTRIES_PER_CATEGORY,
    VocabularyDictionary, VocabularyEntry,
};
