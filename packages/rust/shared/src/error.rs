//! Error types for Lexigen.
//!
//! Library crates use [`VocabError`] via `thiserror`.
//! The CLI wraps this with `color-eyre`; the HTTP server maps it onto status codes.

use std::path::PathBuf;

use crate::types::MIN_ENTRIES_PER_CATEGORY;

/// Top-level error type for all Lexigen operations.
///
/// Every pipeline failure is terminal for the request that produced it.
#[derive(Debug, thiserror::Error)]
pub enum VocabError {
    /// No categories remained after normalization.
    #[error("at least one category is required")]
    EmptyRequest,

    /// The completion service credential (or other required setting) is absent.
    #[error("misconfigured: {message}")]
    Misconfigured { message: String },

    /// Network, timeout, or authentication failure talking to the completion service.
    #[error("completion service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The completion service reported an error through its own channel.
    #[error("completion service error: {0}")]
    ServiceError(String),

    /// The model output is not a JSON object. `raw` is for server-side logs only.
    #[error("malformed response: {message}")]
    MalformedResponse { message: String, raw: String },

    /// A requested category is absent from the response (or is not an array).
    #[error("response is missing category '{category}'")]
    IncompleteResponse { category: String },

    /// A requested category has fewer entries than required.
    #[error(
        "category '{category}' has {count} entries, at least {min} required",
        min = MIN_ENTRIES_PER_CATEGORY
    )]
    InsufficientEntries { category: String, count: usize },

    /// A single entry violates the vocabulary entry contract.
    #[error("invalid entry {index} in category '{category}': field '{field}' {reason}")]
    InvalidEntry {
        category: String,
        index: usize,
        field: String,
        reason: String,
    },

    /// Configuration file loading or parsing error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, VocabError>;

/// Stable, machine-readable tag for each [`VocabError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EmptyRequest,
    Misconfigured,
    ServiceUnavailable,
    ServiceError,
    MalformedResponse,
    IncompleteResponse,
    InsufficientEntries,
    InvalidEntry,
    Config,
    Io,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyRequest => "empty_request",
            Self::Misconfigured => "misconfigured",
            Self::ServiceUnavailable => "service_unavailable",
            Self::ServiceError => "service_error",
            Self::MalformedResponse => "malformed_response",
            Self::IncompleteResponse => "incomplete_response",
            Self::InsufficientEntries => "insufficient_entries",
            Self::InvalidEntry => "invalid_entry",
            Self::Config => "config",
            Self::Io => "io",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl VocabError {
    /// Create a misconfiguration error from any displayable message.
    pub fn misconfigured(msg: impl Into<String>) -> Self {
        Self::Misconfigured {
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a malformed-response error, keeping the raw model output for diagnostics.
    pub fn malformed(msg: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: msg.into(),
            raw: raw.into(),
        }
    }

    /// Create an invalid-entry error.
    pub fn invalid_entry(
        category: impl Into<String>,
        index: usize,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidEntry {
            category: category.into(),
            index,
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyRequest => ErrorKind::EmptyRequest,
            Self::Misconfigured { .. } => ErrorKind::Misconfigured,
            Self::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
            Self::ServiceError(_) => ErrorKind::ServiceError,
            Self::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            Self::IncompleteResponse { .. } => ErrorKind::IncompleteResponse,
            Self::InsufficientEntries { .. } => ErrorKind::InsufficientEntries,
            Self::InvalidEntry { .. } => ErrorKind::InvalidEntry,
            Self::Config { .. } => ErrorKind::Config,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    /// Whether this error belongs to the caller-visible "generation failed" class:
    /// anything raised by the completion call or by checking its output.
    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::ServiceUnavailable
                | ErrorKind::ServiceError
                | ErrorKind::MalformedResponse
                | ErrorKind::IncompleteResponse
                | ErrorKind::InsufficientEntries
                | ErrorKind::InvalidEntry
        )
    }

    /// Raw model output attached to a [`VocabError::MalformedResponse`], if any.
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            Self::MalformedResponse { raw, .. } => Some(raw),
            _ => None,
        }
    }
}
