//! Python package source

use async_trait::async_trait;
use hostinv_exec::Probe;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::error::PackageError;
use crate::traits::PackageSource;
use crate::types::{Package, PackageManagerType};

/// pip front-ends tried in order; the first one yielding valid JSON wins
const PIP_COMMANDS: [&str; 2] = ["pip3", "pip"];

#[derive(Deserialize)]
struct PipRow {
    name: String,
    version: String,
}

/// pip package source
#[derive(Debug, Clone)]
pub struct PipSource {
    probe: Probe,
}

impl PipSource {
    /// Create a new pip source
    pub fn new(probe: Probe) -> Self {
        Self { probe }
    }

    /// Parse `pip list --format=json` output
    ///
    /// # Errors
    /// Returns `PackageError::ParseError` if the output is not a JSON listing.
    pub fn parse_list(output: &str) -> Result<Vec<Package>, PackageError> {
        let rows: Vec<PipRow> =
            serde_json::from_str(output).map_err(|e| PackageError::ParseError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| Package::new(row.name, row.version, PackageManagerType::Pip))
            .collect())
    }
}

#[async_trait]
impl PackageSource for PipSource {
    #[instrument(skip(self))]
    async fn list_installed(&self) -> Result<Vec<Package>, PackageError> {
        let mut last_error = PackageError::ManagerNotFound("pip3, pip".to_string());

        for pip in PIP_COMMANDS {
            let cmd = format!("{pip} list --format=json");
            let Some(output) = self.probe.stdout_lenient(&cmd).await else {
                continue;
            };

            match Self::parse_list(&output) {
                Ok(packages) => {
                    info!(tool = pip, count = packages.len(), "found pip packages");
                    return Ok(packages);
                }
                Err(e) => {
                    debug!(tool = pip, error = %e, "unparseable pip output");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    fn manager_type(&self) -> PackageManagerType {
        PackageManagerType::Pip
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use hostinv_exec::ScriptedRunner;

    use super::*;

    #[test]
    fn test_parse_list() {
        let output = r#"[{"name": "requests", "version": "2.31.0"}, {"name": "urllib3", "version": "2.0.7"}]"#;

        let packages = PipSource::parse_list(output).unwrap();

        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0].name, "requests");
        assert_eq!(packages[1].version, "2.0.7");
        assert_eq!(packages[1].manager, PackageManagerType::Pip);
    }

    #[tokio::test]
    async fn test_falls_back_to_pip() {
        let runner = ScriptedRunner::new()
            .with_output("pip3 list --format=json", "WARNING: not json")
            .with_output(
                "pip list --format=json",
                r#"[{"name": "six", "version": "1.16.0"}]"#,
            );
        let source = PipSource::new(Probe::new(Arc::new(runner)));

        let packages = source.list_installed().await.unwrap();

        assert_eq!(packages, vec![Package::new("six", "1.16.0", PackageManagerType::Pip)]);
    }

    #[tokio::test]
    async fn test_no_pip() {
        let source = PipSource::new(Probe::new(Arc::new(ScriptedRunner::new())));

        assert!(matches!(
            source.list_installed().await,
            Err(PackageError::ManagerNotFound(_))
        ));
    }
}
