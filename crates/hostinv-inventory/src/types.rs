//! Inventory type definitions

use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use hostinv_pkg::{Package, PackageManagerType};
use serde::{Deserialize, Serialize};

/// Version string extracted when a banner does not match its pattern
pub const UNKNOWN_VERSION: &str = "unknown";

// ============================================================================
// System Information
// ============================================================================

/// Host identity and operating system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Short hostname
    pub hostname: String,
    /// Fully-qualified domain name
    pub fqdn: String,
    /// Operating system details
    pub os: OsInfo,
    /// Toolchain the agent was built against
    pub runtime_version: String,
    /// Agent release
    pub agent_version: String,
    /// When collection started (local clock); excluded from fingerprinting
    pub collected_at: DateTime<Local>,
}

/// Operating system release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsInfo {
    /// Pretty distribution name (`NAME`)
    pub name: String,
    /// Release string (`VERSION`)
    pub version: String,
    /// Distribution id (`ID`)
    pub distro_id: String,
    /// Numeric release (`VERSION_ID`)
    pub distro_version: String,
    /// Kernel release
    pub kernel: String,
    /// CPU architecture
    pub architecture: String,
}

// ============================================================================
// Hardware
// ============================================================================

/// Hardware summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareInfo {
    /// CPU model name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_model: Option<String>,
    /// Logical CPU count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_cores: Option<u32>,
    /// Total memory in MB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram_mb: Option<u64>,
    /// Whole disks (partitions excluded)
    #[serde(default)]
    pub disks: Vec<Disk>,
    /// Addresses per interface, loopback excluded
    #[serde(default)]
    pub network_interfaces: Vec<NetworkInterface>,
}

/// Block device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disk {
    /// Device path (`/dev/sda`)
    pub device: String,
    /// Size in bytes
    pub size_bytes: u64,
    /// Vendor model string, `Unknown` when not reported
    pub model: String,
}

/// Address assigned to an interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterface {
    /// Interface name
    pub name: String,
    /// IPv4 or IPv6 address without prefix length
    pub ip: String,
}

// ============================================================================
// Services and critical software
// ============================================================================

/// Running service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Unit name without the `.service` suffix
    pub name: String,
    /// Unit sub-state (`SUB` column), `running` when not reported
    pub status: String,
}

/// Detected version of a tracked tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareVersion {
    /// Checklist identifier
    pub name: String,
    /// Extracted version, or `unknown`
    pub version: String,
    /// First line of the tool's version banner
    pub raw_output: String,
}

/// Document schema generation
///
/// Selects the shape of `critical_software`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVersion {
    /// Identifier to raw banner mapping
    V1,
    /// Records with extracted version and raw banner
    #[default]
    V2,
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaVersion::V1 => write!(f, "v1"),
            SchemaVersion::V2 => write!(f, "v2"),
        }
    }
}

/// Critical software versions, tagged with the schema that produced them
///
/// Serialized as `{"schema": "v1", "entries": {...}}` or
/// `{"schema": "v2", "entries": [...]}`. The two shapes are never converted
/// into each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "schema", content = "entries", rename_all = "snake_case")]
pub enum CriticalSoftware {
    /// Identifier to raw banner
    V1(BTreeMap<String, String>),
    /// Ordered version records
    V2(Vec<SoftwareVersion>),
}

impl CriticalSoftware {
    /// Schema this fragment belongs to
    #[must_use]
    pub fn schema(&self) -> SchemaVersion {
        match self {
            CriticalSoftware::V1(_) => SchemaVersion::V1,
            CriticalSoftware::V2(_) => SchemaVersion::V2,
        }
    }

    /// Number of tools detected
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            CriticalSoftware::V1(map) => map.len(),
            CriticalSoftware::V2(list) => list.len(),
        }
    }

    /// Whether no tool was detected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of tools whose version was extracted
    ///
    /// V1 entries carry only raw banners, so every entry counts.
    #[must_use]
    pub fn parsed_count(&self) -> usize {
        match self {
            CriticalSoftware::V1(map) => map.len(),
            CriticalSoftware::V2(list) => list
                .iter()
                .filter(|sw| sw.version != UNKNOWN_VERSION)
                .count(),
        }
    }
}

// ============================================================================
// Full Inventory
// ============================================================================

/// Complete inventory of one host for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryDocument {
    /// System information
    pub system: SystemInfo,
    /// Hardware information
    pub hardware: HardwareInfo,
    /// System packages followed by pip and npm packages
    pub packages: Vec<Package>,
    /// Running services, when service collection is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<Service>>,
    /// Tracked tool versions
    pub critical_software: CriticalSoftware,
}

impl InventoryDocument {
    /// Schema generation of this document
    #[must_use]
    pub fn schema(&self) -> SchemaVersion {
        self.critical_software.schema()
    }

    /// Get package count by manager
    #[must_use]
    pub fn package_count_by_manager(&self) -> BTreeMap<PackageManagerType, usize> {
        let mut counts = BTreeMap::new();
        for pkg in &self.packages {
            *counts.entry(pkg.manager).or_insert(0) += 1;
        }
        counts
    }

    /// Packages reported by the operating system's package manager
    pub fn system_packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter().filter(|p| p.manager.is_system())
    }

    /// Number of running services recorded (zero when not collected)
    #[must_use]
    pub fn service_count(&self) -> usize {
        self.services.as_ref().map_or(0, Vec::len)
    }

    /// Pretty-printed JSON, as written to the local artifact
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_critical_software_is_tagged() {
        let v1 = CriticalSoftware::V1(BTreeMap::from([(
            "git".to_string(),
            "git version 2.39.2".to_string(),
        )]));
        let json = serde_json::to_value(&v1).unwrap();
        assert_eq!(json["schema"], "v1");
        assert_eq!(json["entries"]["git"], "git version 2.39.2");

        let v2 = CriticalSoftware::V2(vec![SoftwareVersion {
            name: "git".to_string(),
            version: "2.39.2".to_string(),
            raw_output: "git version 2.39.2".to_string(),
        }]);
        let json = serde_json::to_value(&v2).unwrap();
        assert_eq!(json["schema"], "v2");
        assert_eq!(json["entries"][0]["version"], "2.39.2");
    }

    #[test]
    fn test_schemas_are_not_interchangeable() {
        // A mapping labelled as v2 must be rejected rather than coerced.
        let mislabelled = r#"{"schema": "v2", "entries": {"git": "git version 2.39.2"}}"#;
        assert!(serde_json::from_str::<CriticalSoftware>(mislabelled).is_err());
    }

    #[test]
    fn test_parsed_count() {
        let sw = CriticalSoftware::V2(vec![
            SoftwareVersion {
                name: "nginx".to_string(),
                version: "1.18.0".to_string(),
                raw_output: "nginx version: nginx/1.18.0".to_string(),
            },
            SoftwareVersion {
                name: "java".to_string(),
                version: UNKNOWN_VERSION.to_string(),
                raw_output: "openjdk 21 2023-09-19".to_string(),
            },
        ]);

        assert_eq!(sw.len(), 2);
        assert_eq!(sw.parsed_count(), 1);
        assert!(CriticalSoftware::V1(BTreeMap::new()).is_empty());
    }
}
