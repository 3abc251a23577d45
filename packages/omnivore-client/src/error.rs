//! Error types for the Omnivore client.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OmnivoreError>;

#[derive(Debug, Error)]
pub enum OmnivoreError {
    /// Missing API key or unusable settings. Raised before any request is sent.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from the GraphQL endpoint
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// `errors` array in an otherwise successful response
    #[error("GraphQL errors: {}", .0.join("; "))]
    GraphQL(Vec<String>),

    /// Operation-level failure union (`ArticleError`, `CreateHighlightError`)
    #[error("{operation} rejected: {}", .codes.join(", "))]
    Rejected {
        operation: &'static str,
        codes: Vec<String>,
    },

    #[error("Parse error: {0}")]
    Parse(String),
}
