//! hostinv-core: Change-aware collection and delivery
//!
//! Ties the collectors, local storage and the delivery client into a single
//! [`Pipeline`] run, driven by [`AgentConfig`].

pub mod change;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod store;

pub use change::{ChangeDecision, ChangePolicy, Fingerprint, decide, decide_with_policy};
pub use config::{
    AgentConfig, AgentSettings, ChangeDetectionConfig, CollectionConfig, DeliveryConfig,
    StorageConfig,
};
pub use error::{ConfigError, PipelineError, StoreError};
pub use pipeline::{ArtifactInfo, Pipeline, RunReport};
pub use store::ArtifactStore;
