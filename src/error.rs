//! Error types for the advice client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {

    // =============================
    // Consumer Errors
    // =============================

    #[error("Advice backend returned status {status}: {body}")]
    BackendStatus { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Config(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
