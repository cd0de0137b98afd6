//! Error types for the lernkarten_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for lernkarten_core operations
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

    /// Import record rejected before duplicate detection
    #[error("Import error: {0}")]
    Import(String),

    /// Card rejected because a required field is blank
    #[error("Invalid card: field '{0}' must not be empty")]
    BlankField(&'static str),

    /// No card with the given id exists in the store
    #[error("Card not found: {0}")]
    CardNotFound(String),

    /// Card store is unreadable or inconsistent
    #[error("Store error: {0}")]
    Store(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
