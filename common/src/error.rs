use thiserror::Error;

/// Classification for everything that can go wrong during a scan.
///
/// `InvalidDescriptor` is absorbed by the resolver (it falls back to a
/// single-unit plan instead of surfacing). The per-unit kinds
/// (`UnknownTool`, `WorkerFailure`, `Timeout`) are recorded in the unit's
/// outcome and do not fail the session unless the strict policy is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScanErrorKind {
    /// The target descriptor could not be turned into a usable scan plan.
    #[error("invalid target descriptor")]
    InvalidDescriptor,
    /// Dispatch was asked for a name with no registered worker.
    #[error("unknown tool")]
    UnknownTool,
    /// A tool returned an error or panicked mid-invocation.
    #[error("worker failure")]
    WorkerFailure,
    /// A unit exceeded its per-invocation deadline.
    #[error("unit timed out")]
    Timeout,
    /// The session was cancelled because a newer one started.
    #[error("session superseded")]
    SessionSuperseded,
}
