//! Fact collectors
//!
//! Each collector takes a [`Probe`](hostinv_exec::Probe), queries one kind of
//! source, and returns a fragment. None of them can fail: a missing tool, a
//! non-zero exit, unparseable output, or a timeout all produce an empty or
//! defaulted fragment.

pub mod hardware;
pub mod packages;
pub mod services;
pub mod software;
pub mod system;

pub use hardware::collect_hardware;
pub use packages::{collect_language_packages, collect_system_packages};
pub use services::collect_services;
pub use software::collect_critical_software;
pub use system::collect_system;
