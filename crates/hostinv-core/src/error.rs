//! Error types for hostinv-core

use std::path::PathBuf;

use hostinv_client::DeliveryError;
use thiserror::Error;

/// Errors writing or reading local state
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem operation failed
    #[error("failed to write {path}: {source}")]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Document could not be serialized
    #[error("failed to serialize inventory: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Config file
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Required setting is empty
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    /// Endpoint is not an http(s) URL
    #[error("invalid delivery endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint {
        /// Configured endpoint
        endpoint: String,
        /// Why it was rejected
        reason: String,
    },

    /// A timeout is set to zero
    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Fatal errors of one collection run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Agent requires root and is not running as root
    #[error("root privileges required (running as uid {uid})")]
    NotRoot {
        /// Effective uid reported by `id -u`, or `unknown`
        uid: String,
    },

    /// Document could not be fingerprinted
    #[error("failed to fingerprint inventory: {0}")]
    Fingerprint(#[source] serde_json::Error),

    /// Local persistence failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Delivery failed
    #[error("delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}
