//! Installed packages from the system manager and language ecosystems

use hostinv_exec::Probe;
use hostinv_pkg::{NpmSource, Package, PackageSource, PipSource, detect_system_source};
use tracing::{info, instrument, warn};

/// Collect packages from the detected system manager (dpkg or rpm)
#[instrument(skip(probe))]
pub async fn collect_system_packages(probe: &Probe) -> Vec<Package> {
    match detect_system_source(probe).await {
        Some(source) => list_or_empty(source.as_ref()).await,
        None => Vec::new(),
    }
}

/// Collect pip packages followed by global npm packages
#[instrument(skip(probe))]
pub async fn collect_language_packages(probe: &Probe) -> Vec<Package> {
    let mut packages = list_or_empty(&PipSource::new(probe.clone())).await;
    info!(count = packages.len(), "pip packages");

    let npm = list_or_empty(&NpmSource::new(probe.clone())).await;
    info!(count = npm.len(), "npm packages");

    packages.extend(npm);
    packages
}

async fn list_or_empty(source: &dyn PackageSource) -> Vec<Package> {
    match source.list_installed().await {
        Ok(packages) => packages,
        Err(e) => {
            warn!(manager = %source.manager_type(), error = %e, "package listing unavailable");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use hostinv_exec::ScriptedRunner;
    use hostinv_pkg::PackageManagerType;
    use hostinv_pkg::dpkg::DPKG_QUERY;

    use super::*;

    #[tokio::test]
    async fn test_system_packages_from_dpkg() {
        let runner = ScriptedRunner::new().with_binary("dpkg").with_output(
            DPKG_QUERY,
            "curl\t7.68.0\tinstall ok installed\nold\t1.0\tdeinstall ok config-files",
        );
        let probe = Probe::new(Arc::new(runner));

        let packages = collect_system_packages(&probe).await;

        assert_eq!(
            packages,
            vec![Package::new("curl", "7.68.0", PackageManagerType::Dpkg)]
        );
    }

    #[tokio::test]
    async fn test_missing_managers_yield_empty() {
        let probe = Probe::new(Arc::new(ScriptedRunner::new()));

        assert!(collect_system_packages(&probe).await.is_empty());
        assert!(collect_language_packages(&probe).await.is_empty());
    }

    #[tokio::test]
    async fn test_language_packages_order() {
        let runner = ScriptedRunner::new()
            .with_output(
                "pip3 list --format=json",
                r#"[{"name": "requests", "version": "2.31.0"}]"#,
            )
            .with_output(
                "npm list -g --depth=0 --json",
                r#"{"dependencies": {"npm": {"version": "10.2.4"}}}"#,
            );
        let probe = Probe::new(Arc::new(runner));

        let packages = collect_language_packages(&probe).await;

        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0].manager, PackageManagerType::Pip);
        assert_eq!(packages[1].manager, PackageManagerType::Npm);
    }
}
