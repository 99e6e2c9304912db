//! Name-keyed tool registry and the single dispatch entry point.
//!
//! Every worker, real or simulated, sits behind the [`Tool`] trait and is
//! invoked through [`ToolRegistry::dispatch`], which normalizes whatever
//! happens inside the worker into one [`ToolOutcome`]: unknown names,
//! returned errors and panics all come back as failure envelopes, never as
//! an escaped error. Retry policy deliberately does not live here; tools
//! differ in idempotency, so retries are the caller's decision.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use optiscan_common::error::ScanErrorKind;
use optiscan_common::report::{ToolInvocation, ToolOutcome};

/// A named, pluggable worker invoked once per scan unit.
///
/// Implementations return `Err` for internal failures; dispatch converts
/// those into `ToolOutcome::Failed` so callers only ever deal with the
/// envelope.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn describe(&self) -> &str {
        ""
    }

    async fn invoke(&self, invocation: &ToolInvocation) -> anyhow::Result<ToolOutcome>;
}

type WorkerFuture = Pin<Box<dyn Future<Output = anyhow::Result<ToolOutcome>> + Send>>;

/// Adapter so plain async closures can be registered without a dedicated
/// struct, mainly for tests and one-off workers.
struct FnTool {
    name: String,
    description: String,
    worker: Box<dyn Fn(ToolInvocation) -> WorkerFuture + Send + Sync>,
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn describe(&self) -> &str {
        &self.description
    }

    async fn invoke(&self, invocation: &ToolInvocation) -> anyhow::Result<ToolOutcome> {
        (self.worker)(invocation.clone()).await
    }
}

/// The name-to-worker table.
///
/// Read-mostly after startup: the orchestrator holds it behind an `Arc`
/// and reads it concurrently without locking. Registration during an
/// active session is unsupported.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one entry. Last write wins, so tests can override a built-in
    /// by registering under the same name.
    pub fn register(&mut self, tool: impl Tool + 'static) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), Arc::new(tool)).is_some() {
            debug!("tool '{name}' re-registered, previous worker replaced");
        }
    }

    /// Registers an async closure as a worker.
    pub fn register_fn<F, Fut>(&mut self, name: &str, description: &str, worker: F)
    where
        F: Fn(ToolInvocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<ToolOutcome>> + Send + 'static,
    {
        self.register(FnTool {
            name: name.to_string(),
            description: description.to_string(),
            worker: Box::new(move |invocation| Box::pin(worker(invocation))),
        });
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Sorted `(name, description)` listing for display.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .tools
            .values()
            .map(|tool| (tool.name().to_string(), tool.describe().to_string()))
            .collect();
        entries.sort();
        entries
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invokes the named worker and normalizes its outcome.
    ///
    /// The worker runs on its own task so a panicking tool is isolated and
    /// reported as a `WorkerFailure` instead of tearing down the session.
    pub async fn dispatch(&self, invocation: &ToolInvocation) -> ToolOutcome {
        let Some(tool) = self.get(&invocation.tool_name) else {
            return ToolOutcome::fail(
                ScanErrorKind::UnknownTool,
                format!("no worker registered under '{}'", invocation.tool_name),
            );
        };

        let owned = invocation.clone();
        let joined = tokio::spawn(async move { tool.invoke(&owned).await }).await;

        match joined {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => ToolOutcome::fail(
                ScanErrorKind::WorkerFailure,
                format!("'{}' failed: {err:#}", invocation.tool_name),
            ),
            Err(join_err) if join_err.is_panic() => ToolOutcome::fail(
                ScanErrorKind::WorkerFailure,
                format!("'{}' panicked mid-invocation", invocation.tool_name),
            ),
            Err(_) => ToolOutcome::fail(
                ScanErrorKind::WorkerFailure,
                format!("'{}' was aborted", invocation.tool_name),
            ),
        }
    }

    /// [`dispatch`](Self::dispatch) with a per-invocation deadline; expiry
    /// resolves the unit as a `Timeout` failure instead of blocking the
    /// caller indefinitely.
    pub async fn dispatch_within(
        &self,
        invocation: &ToolInvocation,
        deadline: Duration,
    ) -> ToolOutcome {
        match tokio::time::timeout(deadline, self.dispatch(invocation)).await {
            Ok(outcome) => outcome,
            Err(_) => ToolOutcome::fail(
                ScanErrorKind::Timeout,
                format!(
                    "'{}' exceeded {}ms against {}",
                    invocation.tool_name,
                    deadline.as_millis(),
                    invocation.subject
                ),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optiscan_common::report::Discovery;

    fn hit_worker(registry: &mut ToolRegistry, name: &str) {
        registry.register_fn(name, "always hits", |inv| async move {
            Ok(ToolOutcome::hit(Discovery::new(inv.subject, "found")))
        });
    }

    #[tokio::test]
    async fn unknown_tool_never_escapes() {
        let registry = ToolRegistry::new();
        let outcome = registry
            .dispatch(&ToolInvocation::new("ghost", "10.0.0.1"))
            .await;
        assert_eq!(outcome.error_kind(), Some(ScanErrorKind::UnknownTool));
    }

    #[tokio::test]
    async fn registered_worker_is_dispatched() {
        let mut registry = ToolRegistry::new();
        hit_worker(&mut registry, "probe");

        let outcome = registry
            .dispatch(&ToolInvocation::new("probe", "10.0.0.1"))
            .await;
        match outcome {
            ToolOutcome::Ok {
                discovery: Some(d),
            } => assert_eq!(d.subject, "10.0.0.1"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn worker_error_becomes_failure_envelope() {
        let mut registry = ToolRegistry::new();
        registry.register_fn("broken", "always errors", |_inv| async move {
            anyhow::bail!("socket melted")
        });

        let outcome = registry
            .dispatch(&ToolInvocation::new("broken", "10.0.0.1"))
            .await;
        match outcome {
            ToolOutcome::Failed { kind, message } => {
                assert_eq!(kind, ScanErrorKind::WorkerFailure);
                assert!(message.contains("socket melted"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn panicking_worker_is_isolated() {
        let mut registry = ToolRegistry::new();
        let should_panic = true;
        registry.register_fn("kaboom", "always panics", move |_inv| async move {
            if should_panic {
                panic!("worker bug");
            }
            Ok(ToolOutcome::miss())
        });

        let outcome = registry
            .dispatch(&ToolInvocation::new("kaboom", "10.0.0.1"))
            .await;
        assert_eq!(outcome.error_kind(), Some(ScanErrorKind::WorkerFailure));
    }

    #[tokio::test]
    async fn slow_worker_times_out() {
        let mut registry = ToolRegistry::new();
        registry.register_fn("sloth", "sleeps", |_inv| async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(ToolOutcome::miss())
        });

        let outcome = registry
            .dispatch_within(
                &ToolInvocation::new("sloth", "10.0.0.1"),
                Duration::from_millis(20),
            )
            .await;
        assert_eq!(outcome.error_kind(), Some(ScanErrorKind::Timeout));
    }

    #[tokio::test]
    async fn last_registration_wins() {
        let mut registry = ToolRegistry::new();
        registry.register_fn("probe", "first", |_inv| async move {
            Ok(ToolOutcome::miss())
        });
        hit_worker(&mut registry, "probe");
        assert_eq!(registry.len(), 1);

        let outcome = registry
            .dispatch(&ToolInvocation::new("probe", "10.0.0.1"))
            .await;
        assert!(matches!(
            outcome,
            ToolOutcome::Ok {
                discovery: Some(_)
            }
        ));
    }

    #[test]
    fn entries_are_sorted_for_display() {
        let mut registry = ToolRegistry::new();
        hit_worker(&mut registry, "zeta");
        hit_worker(&mut registry, "alpha");

        let names: Vec<String> = registry.entries().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["alpha".to_string(), "zeta".to_string()]);
    }
}
