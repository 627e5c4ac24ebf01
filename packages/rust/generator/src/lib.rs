//! Vocabulary generation pipeline.
//!
//! This crate provides:
//! - [`normalize`] - raw category input → [`GenerationRequest`](lexigen_shared::GenerationRequest)
//! - [`prompt`] - deterministic prompt rendering
//! - [`client`] - the [`CompletionService`] seam and the OpenAI-compatible [`OpenAiClient`]
//! - [`parser`] / [`validate`] - strict parse, then schema validation of model output
//! - [`pipeline`] - the stages chained end to end ([`generate`])

pub mod client;
pub mod normalize;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod validate;

pub use client::{CompletionService, OpenAiClient};
pub use normalize::normalize_categories;
pub use parser::parse_response;
pub use pipeline::{generate, generate_for};
pub use prompt::{RenderedPrompt, SYSTEM_PROMPT, build_prompt};
pub use validate::validate_document;
