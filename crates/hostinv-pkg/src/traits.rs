//! Package source trait

use async_trait::async_trait;

use crate::error::PackageError;
use crate::types::{Package, PackageManagerType};

/// A package manager that can list what is installed
#[async_trait]
pub trait PackageSource: Send + Sync {
    /// List installed packages in the order the tool reports them
    async fn list_installed(&self) -> Result<Vec<Package>, PackageError>;

    /// Which manager this source queries
    fn manager_type(&self) -> PackageManagerType;
}
