//! Error types for inventory delivery

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while delivering an inventory
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Payload serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid endpoint URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Endpoint is not http or https
    #[error("Unsupported endpoint scheme: {0}")]
    UnsupportedScheme(String),

    /// Whole transfer exceeded its ceiling
    #[error("Delivery timed out after {timeout:?}")]
    Timeout {
        /// Ceiling that was exceeded
        timeout: Duration,
    },

    /// Endpoint answered with a non-success status
    #[error("Endpoint returned HTTP {status}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, for debugging
        body: String,
    },

    /// Transport failure not covered above
    #[error("Transport error: {0}")]
    Transport(String),
}

impl DeliveryError {
    /// Whether the endpoint was never reached
    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect() || e.is_timeout(),
            Self::Timeout { .. } | Self::Transport(_) => true,
            _ => false,
        }
    }
}

/// Result type for delivery operations
pub type Result<T> = std::result::Result<T, DeliveryError>;
