//! Global Node.js package source

use std::collections::BTreeMap;

use async_trait::async_trait;
use hostinv_exec::Probe;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::error::PackageError;
use crate::traits::PackageSource;
use crate::types::{Package, PackageManagerType};

const NPM_LIST: &str = "npm list -g --depth=0 --json";

#[derive(Deserialize)]
struct NpmTree {
    #[serde(default)]
    dependencies: BTreeMap<String, NpmDependency>,
}

#[derive(Deserialize)]
struct NpmDependency {
    version: Option<String>,
}

/// npm global package source
#[derive(Debug, Clone)]
pub struct NpmSource {
    probe: Probe,
}

impl NpmSource {
    /// Create a new npm source
    pub fn new(probe: Probe) -> Self {
        Self { probe }
    }

    /// Parse `npm list -g --json` output
    ///
    /// Dependencies without a resolved version (missing or invalid installs)
    /// are recorded as `"unknown"`.
    ///
    /// # Errors
    /// Returns `PackageError::ParseError` if the output is not an npm tree.
    pub fn parse_tree(output: &str) -> Result<Vec<Package>, PackageError> {
        let tree: NpmTree =
            serde_json::from_str(output).map_err(|e| PackageError::ParseError(e.to_string()))?;

        Ok(tree
            .dependencies
            .into_iter()
            .map(|(name, dep)| {
                let version = dep.version.unwrap_or_else(|| "unknown".to_string());
                Package::new(name, version, PackageManagerType::Npm)
            })
            .collect())
    }
}

#[async_trait]
impl PackageSource for NpmSource {
    #[instrument(skip(self))]
    async fn list_installed(&self) -> Result<Vec<Package>, PackageError> {
        let output = self
            .probe
            .stdout_lenient(NPM_LIST)
            .await
            .ok_or_else(|| PackageError::ManagerNotFound("npm".to_string()))?;

        let packages = Self::parse_tree(&output)?;
        info!(count = packages.len(), "found npm packages");

        Ok(packages)
    }

    fn manager_type(&self) -> PackageManagerType {
        PackageManagerType::Npm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tree() {
        let output = r#"{
            "name": "lib",
            "dependencies": {
                "npm": {"version": "10.2.4"},
                "corepack": {"version": "0.22.0"},
                "broken": {"missing": true}
            }
        }"#;

        let packages = NpmSource::parse_tree(output).unwrap();

        assert_eq!(packages.len(), 3);
        let broken = packages.iter().find(|p| p.name == "broken").unwrap();
        assert_eq!(broken.version, "unknown");
        assert!(packages.iter().all(|p| p.manager == PackageManagerType::Npm));
    }

    #[test]
    fn test_parse_tree_without_dependencies() {
        let packages = NpmSource::parse_tree("{}").unwrap();
        assert!(packages.is_empty());
    }

    #[test]
    fn test_parse_tree_garbage() {
        assert!(matches!(
            NpmSource::parse_tree("npm ERR! code ENOENT"),
            Err(PackageError::ParseError(_))
        ));
    }
}
