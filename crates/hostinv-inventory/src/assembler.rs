//! Inventory assembly

use chrono::Local;
use hostinv_exec::Probe;
use tracing::{info, instrument};

use crate::collectors::{
    collect_critical_software, collect_hardware, collect_language_packages, collect_services,
    collect_system, collect_system_packages,
};
use crate::types::{InventoryDocument, SchemaVersion};

/// What goes into a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblerOptions {
    /// Shape of the critical software section
    pub schema: SchemaVersion,
    /// Include running services
    pub collect_services: bool,
    /// Include pip and npm packages
    pub collect_language_packages: bool,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            schema: SchemaVersion::default(),
            collect_services: false,
            collect_language_packages: true,
        }
    }
}

/// Runs every collector in a fixed order and builds one [`InventoryDocument`]
#[derive(Debug, Clone)]
pub struct InventoryAssembler {
    probe: Probe,
    options: AssemblerOptions,
}

impl InventoryAssembler {
    /// Create a new assembler
    pub fn new(probe: Probe, options: AssemblerOptions) -> Self {
        Self { probe, options }
    }

    /// Collect a full document
    ///
    /// Never fails. Collector failures leave their section empty or defaulted
    /// and are logged by the collector itself.
    #[instrument(skip(self), fields(schema = %self.options.schema))]
    pub async fn assemble(&self) -> InventoryDocument {
        let collected_at = Local::now();
        info!("collecting inventory");

        info!("collecting system information");
        let system = collect_system(&self.probe, collected_at).await;
        info!(hostname = %system.hostname, os = %system.os.name, "system information collected");

        info!("collecting hardware information");
        let hardware = collect_hardware(&self.probe).await;
        info!(
            disks = hardware.disks.len(),
            interfaces = hardware.network_interfaces.len(),
            "hardware information collected"
        );

        info!("collecting installed packages");
        let mut packages = collect_system_packages(&self.probe).await;
        info!(count = packages.len(), "system packages collected");

        if self.options.collect_language_packages {
            packages.extend(collect_language_packages(&self.probe).await);
        }

        let services = if self.options.collect_services {
            info!("collecting running services");
            let services = collect_services(&self.probe).await;
            info!(count = services.len(), "services collected");
            Some(services)
        } else {
            None
        };

        info!("checking critical software versions");
        let critical_software = collect_critical_software(&self.probe, self.options.schema).await;
        info!(
            detected = critical_software.len(),
            parsed = critical_software.parsed_count(),
            "critical software checked"
        );

        InventoryDocument {
            system,
            hardware,
            packages,
            services,
            critical_software,
        }
    }
}
