//! NSX client errors

use thiserror::Error;

/// Errors that can occur when interacting with the NSX-T policy API
#[derive(Debug, Error)]
pub enum NsxError {
    /// HTTP request/response error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// NSX manager returned an error
    #[error("NSX API error: {0}")]
    Api(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authentication failed (bad credentials, expired session, etc.)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request (e.g., malformed path or query)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}
