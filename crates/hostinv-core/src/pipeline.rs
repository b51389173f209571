//! One collection run, start to finish

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use hostinv_client::{DeliveryClient, DeliveryOutcome, Transport};
use hostinv_exec::{CommandRunner, Probe};
use hostinv_inventory::{InventoryAssembler, InventoryDocument, PackageManagerType};
use tracing::{error, info, instrument};

use crate::change::{ChangeDecision, ChangePolicy, Fingerprint, decide_with_policy};
use crate::config::AgentConfig;
use crate::error::PipelineError;
use crate::store::ArtifactStore;

/// What a run did, for the final summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Short hostname
    pub hostname: String,
    /// Operating system name and version
    pub os: String,
    /// Packages per manager
    pub package_counts: BTreeMap<PackageManagerType, usize>,
    /// Running services, when collected
    pub service_count: Option<usize>,
    /// Tracked tools found on the host
    pub software_detected: usize,
    /// Tracked tools whose version could be extracted
    pub software_parsed: usize,
    /// Change detection outcome
    pub decision: ChangeDecision,
    /// Fingerprint of this run's document
    pub fingerprint: Fingerprint,
    /// Artifact written this run
    pub artifact: Option<ArtifactInfo>,
    /// Delivery result, absent when skipped
    pub delivery: Option<DeliveryOutcome>,
    /// Wall-clock time of the run
    pub elapsed: Duration,
}

/// Artifact written to local storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactInfo {
    /// File path
    pub path: PathBuf,
    /// Size in bytes
    pub bytes: u64,
}

impl RunReport {
    fn new(doc: &InventoryDocument, decision: ChangeDecision, fingerprint: Fingerprint) -> Self {
        let os = &doc.system.os;
        Self {
            hostname: doc.system.hostname.clone(),
            os: format!("{} {}", os.name, os.version).trim().to_string(),
            package_counts: doc.package_count_by_manager(),
            service_count: doc.services.as_ref().map(Vec::len),
            software_detected: doc.critical_software.len(),
            software_parsed: doc.critical_software.parsed_count(),
            decision,
            fingerprint,
            artifact: None,
            delivery: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Total packages across managers
    pub fn total_packages(&self) -> usize {
        self.package_counts.values().sum()
    }

    /// Whether delivery was skipped because nothing changed
    pub fn skipped(&self) -> bool {
        !self.decision.should_send()
    }
}

/// Collect, detect change, persist, deliver
pub struct Pipeline {
    probe: Probe,
    assembler: InventoryAssembler,
    store: ArtifactStore,
    delivery: DeliveryClient,
    policy: ChangePolicy,
    require_root: bool,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("store", &self.store)
            .field("delivery", &self.delivery)
            .field("policy", &self.policy)
            .field("require_root", &self.require_root)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Build a pipeline from configuration
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        transport: Arc<dyn Transport>,
        config: &AgentConfig,
    ) -> Self {
        let probe = Probe::new(runner).with_timeout(config.command_timeout());
        Self {
            assembler: InventoryAssembler::new(probe.clone(), config.assembler_options()),
            probe,
            store: ArtifactStore::from_config(&config.storage),
            delivery: DeliveryClient::new(transport, config.delivery_settings()),
            policy: config.change_detection.policy,
            require_root: config.agent.require_root,
        }
    }

    /// Override the change policy
    #[must_use]
    pub fn with_policy(mut self, policy: ChangePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Local storage used by this pipeline
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Run once
    ///
    /// The fingerprint is recorded only after a successful delivery, so a
    /// failed delivery is retried by the next run.
    ///
    /// # Errors
    /// Returns an error when privileges are missing, local state cannot be
    /// written, or delivery fails.
    #[instrument(skip(self), fields(policy = ?self.policy))]
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let started = Instant::now();

        if self.require_root {
            self.check_root().await?;
        }

        let doc = self.assembler.assemble().await;
        let fingerprint = Fingerprint::of(&doc).map_err(PipelineError::Fingerprint)?;

        let previous = match self.policy {
            ChangePolicy::AlwaysSend => None,
            ChangePolicy::Fingerprint => self.store.load_fingerprint()?,
        };
        let decision = decide_with_policy(self.policy, &fingerprint, previous.as_ref());
        let mut report = RunReport::new(&doc, decision, fingerprint);

        if !decision.should_send() {
            info!(fingerprint = report.fingerprint.short(), "inventory unchanged, skipping delivery");
            report.elapsed = started.elapsed();
            return Ok(report);
        }
        info!(%decision, fingerprint = report.fingerprint.short(), "inventory will be delivered");

        let bytes = self.store.store(&doc)?;
        let path = self.store.artifact_path().to_path_buf();
        info!(path = %path.display(), bytes, "artifact saved");
        report.artifact = Some(ArtifactInfo { path, bytes });

        let outcome = match self.delivery.deliver(&doc).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(endpoint = %self.delivery.endpoint(), error = %e, "delivery failed");
                return Err(e.into());
            }
        };
        info!(%outcome, "delivery complete");

        self.store.store_fingerprint(&report.fingerprint)?;
        report.delivery = Some(outcome);
        report.elapsed = started.elapsed();
        Ok(report)
    }

    async fn check_root(&self) -> Result<(), PipelineError> {
        match self.probe.stdout("id -u").await {
            Some(uid) if uid == "0" => Ok(()),
            Some(uid) => Err(PipelineError::NotRoot { uid }),
            None => Err(PipelineError::NotRoot {
                uid: "unknown".to_string(),
            }),
        }
    }
}
