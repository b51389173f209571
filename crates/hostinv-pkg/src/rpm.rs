//! rpm package source (Fedora/RHEL/CentOS)

use async_trait::async_trait;
use hostinv_exec::Probe;
use tracing::{debug, info, instrument};

use crate::error::PackageError;
use crate::traits::PackageSource;
use crate::types::{Package, PackageManagerType};

/// Query listing name and version-release, tab-separated
pub const RPM_QUERY: &str = r"rpm -qa --queryformat '%{NAME}\t%{VERSION}-%{RELEASE}\n'";

/// rpm package source implementation
///
/// Serves hosts detected through `rpm`, `dnf`, or `yum`; all three share the
/// same rpm database.
#[derive(Debug, Clone)]
pub struct RpmSource {
    probe: Probe,
}

impl RpmSource {
    /// Create a new rpm source
    pub fn new(probe: Probe) -> Self {
        Self { probe }
    }

    /// Parse `rpm -qa` output
    pub fn parse_installed(output: &str) -> Vec<Package> {
        let mut packages = Vec::new();

        for line in output.lines() {
            // Example: openssl-libs\t3.0.7-25.el9_3
            let parts: Vec<&str> = line.split('\t').collect();
            if parts.len() < 2 {
                continue;
            }

            let name = parts[0].trim();
            if name.is_empty() {
                continue;
            }

            packages.push(Package::new(name, parts[1].trim(), PackageManagerType::Rpm));
        }

        packages
    }
}

#[async_trait]
impl PackageSource for RpmSource {
    #[instrument(skip(self))]
    async fn list_installed(&self) -> Result<Vec<Package>, PackageError> {
        debug!("listing rpm packages");

        let output = self
            .probe
            .stdout(RPM_QUERY)
            .await
            .ok_or_else(|| PackageError::CommandFailed(RPM_QUERY.to_string()))?;

        let packages = Self::parse_installed(&output);
        info!(count = packages.len(), "found rpm packages");

        Ok(packages)
    }

    fn manager_type(&self) -> PackageManagerType {
        PackageManagerType::Rpm
    }
}
