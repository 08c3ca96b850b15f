//! Error types for ollama-tools
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur while driving a chat exchange
#[derive(Debug, Error)]
pub enum ChatError {
    /// Transport-level failure talking to the chat endpoint
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Chat endpoint answered with a non-success status
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Client could not be constructed from its configuration
    #[error("Client error: {0}")]
    Client(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for chat operations
pub type Result<T> = std::result::Result<T, ChatError>;
