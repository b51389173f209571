//! dpkg package source (Debian/Ubuntu)

use async_trait::async_trait;
use hostinv_exec::Probe;
use tracing::{debug, info, instrument};

use crate::error::PackageError;
use crate::traits::PackageSource;
use crate::types::{Package, PackageManagerType};

/// Query listing name, version, and status, one tab-separated line per package
pub const DPKG_QUERY: &str = r"dpkg-query -W -f='${Package}\t${Version}\t${Status}\n'";

/// dpkg package source implementation
#[derive(Debug, Clone)]
pub struct DpkgSource {
    probe: Probe,
}

impl DpkgSource {
    /// Create a new dpkg source
    pub fn new(probe: Probe) -> Self {
        Self { probe }
    }

    /// Parse `dpkg-query` output
    ///
    /// Only packages whose status word is exactly `installed` are kept, so
    /// removed packages with leftover config (`deinstall ok config-files`) and
    /// `not-installed` entries are dropped.
    pub fn parse_installed(output: &str) -> Vec<Package> {
        let mut packages = Vec::new();

        for line in output.lines() {
            // Example: curl\t7.68.0-1ubuntu2.7\tinstall ok installed
            let parts: Vec<&str> = line.split('\t').collect();
            if parts.len() < 3 {
                continue;
            }

            let (name, version, status) = (parts[0].trim(), parts[1].trim(), parts[2]);
            if name.is_empty() {
                continue;
            }

            if status.split_whitespace().any(|word| word == "installed") {
                packages.push(Package::new(name, version, PackageManagerType::Dpkg));
            }
        }

        packages
    }
}

#[async_trait]
impl PackageSource for DpkgSource {
    #[instrument(skip(self))]
    async fn list_installed(&self) -> Result<Vec<Package>, PackageError> {
        debug!("listing dpkg packages");

        let output = self
            .probe
            .stdout(DPKG_QUERY)
            .await
            .ok_or_else(|| PackageError::CommandFailed(DPKG_QUERY.to_string()))?;

        let packages = Self::parse_installed(&output);
        info!(count = packages.len(), "found dpkg packages");

        Ok(packages)
    }

    fn manager_type(&self) -> PackageManagerType {
        PackageManagerType::Dpkg
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use hostinv_exec::ScriptedRunner;

    use super::*;

    #[test]
    fn test_parse_installed() {
        let output = "curl\t7.68.0\tinstall ok installed\n\
                      vim\t2:8.2.2434-3\tinstall ok installed";

        let packages = DpkgSource::parse_installed(output);

        assert_eq!(packages.len(), 2);
        assert_eq!(
            packages[0],
            Package::new("curl", "7.68.0", PackageManagerType::Dpkg)
        );
        assert_eq!(packages[1].name, "vim");
        assert_eq!(packages[1].version, "2:8.2.2434-3");
    }

    #[test]
    fn test_parse_skips_not_installed() {
        let output = "curl\t7.68.0\tinstall ok installed\n\
                      oldpkg\t1.0\tdeinstall ok config-files\n\
                      ghost\t\tunknown ok not-installed\n\
                      broken line";

        let packages = DpkgSource::parse_installed(output);

        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].name, "curl");
    }

    #[tokio::test]
    async fn test_list_installed_missing_tool() {
        let source = DpkgSource::new(Probe::new(Arc::new(ScriptedRunner::new())));

        let result = source.list_installed().await;

        assert!(matches!(result, Err(PackageError::CommandFailed(_))));
    }
}
