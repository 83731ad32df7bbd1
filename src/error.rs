//! Error types for talking to the content API

use thiserror::Error;

/// Failures raised while fetching or decoding content
#[derive(Debug, Error)]
pub enum ContentError {
    /// Transport-level failure (DNS, TLS, connection reset, timeout)
    #[error("request to content API failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("content API returned {status} for {url}")]
    Status { status: u16, url: String },

    /// The access token was rejected
    #[error("content API rejected the access token (status {0})")]
    Unauthorized(u16),

    /// No document matched the requested identifier
    #[error("post not found: {0}")]
    NotFound(String),

    /// The response body did not match the expected shape
    #[error("could not decode content API response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The API info document did not list a master ref
    #[error("content API did not report a master ref")]
    NoMasterRef,

    /// A continuation reference pointed somewhere other than the configured API
    #[error("continuation reference does not belong to {expected}: {found}")]
    ForeignContinuation { expected: String, found: String },

    /// Endpoint or token could not be turned into a usable client
    #[error("invalid content API configuration: {0}")]
    InvalidConfig(String),
}

impl ContentError {
    /// Build the error for a non-success HTTP status
    pub fn from_status(status: u16, url: &str) -> Self {
        match status {
            401 | 403 => Self::Unauthorized(status),
            _ => Self::Status {
                status,
                url: url.to_string(),
            },
        }
    }

    /// Whether this error means the requested post does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Status { status: 404, .. })
    }
}
