//! Type definitions for package discovery

use serde::{Deserialize, Serialize};

/// An installed package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Package name
    pub name: String,
    /// Installed version as reported by the manager
    pub version: String,
    /// Manager that reported it
    pub manager: PackageManagerType,
}

impl Package {
    /// Create a new package record
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        manager: PackageManagerType,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            manager,
        }
    }
}

/// Package manager type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageManagerType {
    /// dpkg (Debian/Ubuntu)
    Dpkg,
    /// rpm (Fedora/RHEL/CentOS)
    Rpm,
    /// Python packages
    Pip,
    /// Global Node.js packages
    Npm,
}

impl PackageManagerType {
    /// Whether this is the operating system's own package manager
    #[must_use]
    pub fn is_system(self) -> bool {
        matches!(self, PackageManagerType::Dpkg | PackageManagerType::Rpm)
    }
}

impl std::fmt::Display for PackageManagerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackageManagerType::Dpkg => write!(f, "dpkg"),
            PackageManagerType::Rpm => write!(f, "rpm"),
            PackageManagerType::Pip => write!(f, "pip"),
            PackageManagerType::Npm => write!(f, "npm"),
        }
    }
}
