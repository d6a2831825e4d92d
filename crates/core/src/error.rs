//! Error types for the vahed domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all vahed operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Corpus errors ---
    #[error("Corpus error: {0}")]
    Corpus(#[from] CorpusError),

    // --- Index errors ---
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    // --- Request contract ---
    #[error("Invalid request: {0}")]
    Request(#[from] RequestError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Corpus file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read corpus file {}: {reason}", path.display())]
    Read { path: PathBuf, reason: String },

    #[error("Failed to parse corpus file {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(#[from] ProviderError),

    #[error("Embedding count mismatch: sent {expected} texts, got {actual} vectors")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("program must not be empty")]
    EmptyProgram,

    #[error("term must be a positive integer, got {0}")]
    InvalidTerm(i64),

    #[error("invalid time slot '{slot}' for {day}: {reason}")]
    InvalidTimeSlot {
        day: String,
        slot: String,
        reason: String,
    },
}
