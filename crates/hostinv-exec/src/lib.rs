//! hostinv-exec: Command execution abstraction
//!
//! Every fact the agent records comes from an external command. Collectors talk
//! to the host only through [`CommandRunner`], so they can be exercised against
//! fixture outputs with [`ScriptedRunner`] instead of the real system tools.

pub mod error;
pub mod local;
pub mod probe;
pub mod result;
pub mod scripted;
pub mod traits;

pub use error::ExecError;
pub use local::LocalRunner;
pub use probe::Probe;
pub use result::CommandResult;
pub use scripted::ScriptedRunner;
pub use traits::CommandRunner;
