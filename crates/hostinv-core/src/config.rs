//! Agent configuration
//!
//! Loaded from TOML. Every section and key is optional except the delivery
//! identity (endpoint, token, server id), which may instead come from the
//! environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use hostinv_client::{DeliverySettings, FormFields, PayloadShape};
use hostinv_inventory::{AssemblerOptions, SchemaVersion};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::change::ChangePolicy;
use crate::error::ConfigError;

/// Environment variable overriding `delivery.endpoint`
pub const ENV_ENDPOINT: &str = "HOSTINV_ENDPOINT";
/// Environment variable overriding `delivery.token`
pub const ENV_TOKEN: &str = "HOSTINV_TOKEN";
/// Environment variable overriding `delivery.server_id`
pub const ENV_SERVER_ID: &str = "HOSTINV_SERVER_ID";

/// Top-level agent configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Process settings
    #[serde(default)]
    pub agent: AgentSettings,
    /// Where the artifact and fingerprint live
    #[serde(default)]
    pub storage: StorageConfig,
    /// What to collect
    #[serde(default)]
    pub collection: CollectionConfig,
    /// Where and how to deliver
    #[serde(default)]
    pub delivery: DeliveryConfig,
    /// When to deliver
    #[serde(default)]
    pub change_detection: ChangeDetectionConfig,
}

/// Process settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Refuse to run unless uid is 0
    pub require_root: bool,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            require_root: true,
        }
    }
}

/// Local storage settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage directory, created if missing
    pub dir: PathBuf,
    /// Artifact file name
    pub artifact: String,
    /// Fingerprint file name
    pub fingerprint: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("/var/lib/rs-agent"),
            artifact: "inventory.json".to_string(),
            fingerprint: ".inventory.hash".to_string(),
        }
    }
}

/// Collection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Per-command timeout in seconds
    pub command_timeout_secs: u64,
    /// Document schema generation
    pub schema: SchemaVersion,
    /// Include running services
    pub collect_services: bool,
    /// Include pip and npm packages
    pub collect_language_packages: bool,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        let options = AssemblerOptions::default();
        Self {
            command_timeout_secs: 30,
            schema: options.schema,
            collect_services: options.collect_services,
            collect_language_packages: options.collect_language_packages,
        }
    }
}

/// Delivery settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Collection endpoint URL
    pub endpoint: String,
    /// Access token
    pub token: String,
    /// Identifier of this host at the endpoint
    pub server_id: String,
    /// Ceiling on one delivery in seconds
    pub timeout_secs: u64,
    /// Payload shape
    pub payload: PayloadShape,
    /// Form field names
    pub fields: FormFields,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            token: String::new(),
            server_id: String::new(),
            timeout_secs: 35,
            payload: PayloadShape::default(),
            fields: FormFields::default(),
        }
    }
}

/// Change detection settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeDetectionConfig {
    /// Delivery policy
    pub policy: ChangePolicy,
}

impl AgentConfig {
    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// Returns an error if the text is not valid configuration.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Replace delivery identity with non-empty values from `lookup`
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(endpoint) = non_empty(ENV_ENDPOINT) {
            self.delivery.endpoint = endpoint;
        }
        if let Some(token) = non_empty(ENV_TOKEN) {
            self.delivery.token = token;
        }
        if let Some(server_id) = non_empty(ENV_SERVER_ID) {
            self.delivery.server_id = server_id;
        }
    }

    /// Check that the configuration can drive a run
    ///
    /// # Errors
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let delivery = &self.delivery;
        if delivery.endpoint.trim().is_empty() {
            return Err(ConfigError::Missing("delivery.endpoint"));
        }
        if delivery.token.trim().is_empty() {
            return Err(ConfigError::Missing("delivery.token"));
        }
        if delivery.server_id.trim().is_empty() {
            return Err(ConfigError::Missing("delivery.server_id"));
        }

        let url = Url::parse(&delivery.endpoint).map_err(|e| ConfigError::InvalidEndpoint {
            endpoint: delivery.endpoint.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEndpoint {
                endpoint: delivery.endpoint.clone(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }

        if delivery.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("delivery.timeout_secs"));
        }
        if self.collection.command_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("collection.command_timeout_secs"));
        }
        if self.storage.artifact.trim().is_empty() {
            return Err(ConfigError::Missing("storage.artifact"));
        }
        if self.storage.fingerprint.trim().is_empty() {
            return Err(ConfigError::Missing("storage.fingerprint"));
        }

        Ok(())
    }

    /// Per-command timeout
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.collection.command_timeout_secs)
    }

    /// Delivery ceiling
    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_secs(self.delivery.timeout_secs)
    }

    /// Collector options
    pub fn assembler_options(&self) -> AssemblerOptions {
        AssemblerOptions {
            schema: self.collection.schema,
            collect_services: self.collection.collect_services,
            collect_language_packages: self.collection.collect_language_packages,
        }
    }

    /// Delivery client settings
    pub fn delivery_settings(&self) -> DeliverySettings {
        DeliverySettings {
            token: self.delivery.token.clone(),
            server_id: self.delivery.server_id.clone(),
            payload: self.delivery.payload,
            fields: self.delivery.fields.clone(),
            timeout: self.delivery_timeout(),
        }
    }
}
