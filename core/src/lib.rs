//! The scan orchestration core.
//!
//! This crate turns a parsed [`TargetDescriptor`] into a bounded scan plan,
//! runs the plan as a cancellable session with streamed progress and
//! results, and dispatches named tools through a uniform registry.
//!
//! **Architectural note:**
//! The core knows nothing about what a tool does. It only knows how to
//! invoke one, time it out and normalize its outcome into the shared
//! envelope, so real and simulated workers are interchangeable behind the
//! [`Tool`] trait.
//!
//! [`TargetDescriptor`]: optiscan_common::network::target::TargetDescriptor

pub mod progress;
pub mod registry;
pub mod resolver;
pub mod session;
pub mod stream;

pub use registry::{Tool, ToolRegistry};
pub use session::{Orchestrator, SessionHandle};
