//! hostinv-pkg: Installed package discovery
//!
//! One [`PackageSource`] per package manager. The system manager (dpkg or rpm)
//! is chosen by a priority probe; language ecosystems (pip, npm) are listed
//! independently.

pub mod detect;
pub mod dpkg;
pub mod error;
pub mod npm;
pub mod pip;
pub mod rpm;
pub mod traits;
pub mod types;

pub use detect::detect_system_source;
pub use dpkg::DpkgSource;
pub use error::PackageError;
pub use npm::NpmSource;
pub use pip::PipSource;
pub use rpm::RpmSource;
pub use traits::PackageSource;
pub use types::{Package, PackageManagerType};
