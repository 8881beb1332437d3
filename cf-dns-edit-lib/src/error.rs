//! Error types for cf-dns-edit operations.
//!
//! Every fallible operation in the library returns [`CfDnsError`]. The
//! variants map onto the four kinds of failure the editor distinguishes:
//! configuration, authentication, transport and validation.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Errors that can occur while editing Cloudflare DNS records.
#[derive(Error, Debug)]
pub enum CfDnsError {
    /// The config file could not be read, parsed or written.
    #[error("configuration error: {0}")]
    Config(String),

    /// The API token is empty, invalid or no longer accepted.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Cloudflare rejected a request or returned something unusable.
    #[error("Cloudflare request failed: {0}")]
    Transport(String),

    /// User input was rejected before any remote call was made.
    #[error("{0}")]
    Validation(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Cloudflare API error reported through the `cloudflare` client.
    #[error("Cloudflare API error: {0}")]
    Cloudflare(#[from] cloudflare::framework::response::ApiFailure),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl CfDnsError {
    /// Whether the error means the token itself is no good.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Whether the error was raised by local input validation.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
