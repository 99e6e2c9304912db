//! The built-in simulated tools and the credential engine.
//!
//! Each tool is a leaf worker behind the core's [`Tool`] trait: it takes an
//! invocation, fabricates a plausible answer and returns it through the
//! shared outcome envelope. The randomness lives entirely in here; the
//! orchestration core never depends on it.
//!
//! [`Tool`]: optiscan_core::Tool

pub mod creds;
pub mod vendors;

mod credaudit;
mod probe;
mod streamcheck;

pub use credaudit::CredAudit;
pub use probe::DeviceProbe;
pub use streamcheck::StreamCheck;

use optiscan_core::ToolRegistry;

/// Registers every built-in tool. Called once at process start-up.
pub fn register_builtin(registry: &mut ToolRegistry) {
    registry.register(DeviceProbe);
    registry.register(StreamCheck);
    registry.register(CredAudit);
}
