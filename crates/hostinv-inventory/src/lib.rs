//! hostinv-inventory: Host fact collection
//!
//! Collectors query one external source each and degrade to an empty fragment
//! on any failure. [`InventoryAssembler`] runs them in a fixed order and places
//! each fragment into its slot of an [`InventoryDocument`].

pub mod assembler;
pub mod collectors;
pub mod types;

pub use assembler::{AssemblerOptions, InventoryAssembler};
pub use types::{
    CriticalSoftware, Disk, HardwareInfo, InventoryDocument, NetworkInterface, OsInfo,
    SchemaVersion, Service, SoftwareVersion, SystemInfo,
};

pub use hostinv_pkg::{Package, PackageManagerType};
