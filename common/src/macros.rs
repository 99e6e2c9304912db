/// Thin wrappers around `tracing` so every crate logs through the same
/// macros and the CLI formatter can style them uniformly.

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        tracing::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        tracing::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        tracing::error!($($arg)*)
    };
}

/// Positive outcome, rendered with its own symbol by the CLI formatter.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        tracing::info!(target: "optiscan::success", $($arg)*)
    };
}
