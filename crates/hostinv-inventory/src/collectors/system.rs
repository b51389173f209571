//! Host identity and operating system release

use std::collections::HashMap;

use chrono::{DateTime, Local};
use hostinv_exec::Probe;
use tracing::{debug, instrument};

use crate::types::{OsInfo, SystemInfo};

/// Agent release recorded in every document
pub const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

const UNKNOWN: &str = "Unknown";

/// Collect system identity
///
/// `collected_at` is supplied by the caller so a run stamps exactly one time.
#[instrument(skip(probe))]
pub async fn collect_system(probe: &Probe, collected_at: DateTime<Local>) -> SystemInfo {
    debug!("collecting system info");

    let hostname = match probe.stdout("hostname").await {
        Some(name) => name,
        None => probe
            .stdout("cat /proc/sys/kernel/hostname")
            .await
            .unwrap_or_else(|| "localhost".to_string()),
    };
    let fqdn = probe
        .stdout("hostname -f")
        .await
        .unwrap_or_else(|| hostname.clone());

    let mut os = detect_os(probe).await;
    os.kernel = probe
        .stdout("uname -r")
        .await
        .unwrap_or_else(|| UNKNOWN.to_string());
    os.architecture = probe
        .stdout("uname -m")
        .await
        .unwrap_or_else(|| UNKNOWN.to_string());

    SystemInfo {
        hostname,
        fqdn,
        os,
        runtime_version: runtime_version(),
        agent_version: AGENT_VERSION.to_string(),
        collected_at,
    }
}

fn runtime_version() -> String {
    let rust_version = env!("CARGO_PKG_RUST_VERSION");
    if rust_version.is_empty() {
        "rust".to_string()
    } else {
        format!("rust {rust_version}")
    }
}

/// Detect the distribution
///
/// Tries `/etc/os-release`, then the legacy RedHat and Debian release files.
/// Kernel and architecture are left for the caller to fill in.
pub async fn detect_os(probe: &Probe) -> OsInfo {
    if let Some(content) = probe.stdout("cat /etc/os-release").await {
        return parse_os_release(&content);
    }

    if let Some(content) = probe.stdout("cat /etc/redhat-release").await {
        return OsInfo {
            name: content,
            version: UNKNOWN.to_string(),
            distro_id: "rhel-based".to_string(),
            distro_version: UNKNOWN.to_string(),
            kernel: String::new(),
            architecture: String::new(),
        };
    }

    if let Some(version) = probe.stdout("cat /etc/debian_version").await {
        return OsInfo {
            name: "Debian".to_string(),
            version: version.clone(),
            distro_id: "debian".to_string(),
            distro_version: version,
            kernel: String::new(),
            architecture: String::new(),
        };
    }

    OsInfo {
        name: UNKNOWN.to_string(),
        version: UNKNOWN.to_string(),
        distro_id: "unknown".to_string(),
        distro_version: UNKNOWN.to_string(),
        kernel: String::new(),
        architecture: String::new(),
    }
}

/// Parse `/etc/os-release` key/value pairs
pub fn parse_os_release(content: &str) -> OsInfo {
    let fields: HashMap<&str, &str> = content
        .lines()
        .filter_map(|line| line.trim().split_once('='))
        .map(|(key, value)| (key.trim(), value.trim().trim_matches('"').trim_matches('\'')))
        .collect();

    let get = |key: &str, default: &str| {
        fields
            .get(key)
            .map_or_else(|| default.to_string(), |v| (*v).to_string())
    };

    OsInfo {
        name: get("NAME", UNKNOWN),
        version: get("VERSION", UNKNOWN),
        distro_id: get("ID", "unknown"),
        distro_version: get("VERSION_ID", UNKNOWN),
        kernel: String::new(),
        architecture: String::new(),
    }
}
