//! System package manager detection

use std::sync::Arc;

use hostinv_exec::Probe;
use tracing::{info, warn};

use crate::dpkg::DpkgSource;
use crate::rpm::RpmSource;
use crate::traits::PackageSource;
use crate::types::PackageManagerType;

/// Binaries probed in priority order: Debian family first, then RedHat family
pub const PROBE_ORDER: [(&str, PackageManagerType); 5] = [
    ("dpkg", PackageManagerType::Dpkg),
    ("apt", PackageManagerType::Dpkg),
    ("rpm", PackageManagerType::Rpm),
    ("dnf", PackageManagerType::Rpm),
    ("yum", PackageManagerType::Rpm),
];

/// Detect the system package manager by probing the host
///
/// The first binary found decides the single extraction strategy; managers
/// are never merged. Returns `None` when no supported manager exists.
pub async fn detect_system_source(probe: &Probe) -> Option<Arc<dyn PackageSource>> {
    for (binary, manager) in PROBE_ORDER {
        if !probe.has_binary(binary).await {
            continue;
        }

        info!(binary, %manager, "detected system package manager");
        let source: Arc<dyn PackageSource> = match manager {
            PackageManagerType::Rpm => Arc::new(RpmSource::new(probe.clone())),
            _ => Arc::new(DpkgSource::new(probe.clone())),
        };
        return Some(source);
    }

    warn!("no supported package manager found (tried dpkg, apt, rpm, dnf, yum)");
    None
}
