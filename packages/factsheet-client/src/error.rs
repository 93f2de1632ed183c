//! Error types for the Factsheet client.

use thiserror::Error;

/// Result type for Factsheet client operations.
pub type Result<T> = std::result::Result<T, FactsheetError>;

/// Factsheet client errors.
#[derive(Debug, Error)]
pub enum FactsheetError {
    /// Configuration error (missing credentials file, malformed content)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Token exchange failed (non-2xx from the token endpoint, missing token)
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Network error (connection refused, timeout, no HTTP response)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The GraphQL endpoint answered with an unexpected HTTP status
    #[error("Could not connect to GraphQL server (HTTP {status}): {body}")]
    Connection { status: u16, body: String },

    /// The response payload carried a GraphQL `errors` list
    #[error("GraphQL error while {context}: {messages}")]
    GraphQl { context: String, messages: String },

    /// Structural parameters could not be turned into a valid document
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Parse error (invalid JSON, unexpected response shape)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for FactsheetError {
    fn from(err: serde_json::Error) -> Self {
        FactsheetError::Parse(err.to_string())
    }
}
