//! Error types for the loadcoach_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for loadcoach_core operations
///
/// The suggestion engine itself never returns these; it reports missing or
/// degenerate data through `SuggestionResult::rationale` instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected user input (e.g. a set with zero reps)
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
