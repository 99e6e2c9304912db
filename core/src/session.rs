//! The session state machine and its orchestrator.
//!
//! An [`Orchestrator`] owns the tool registry and at most one running
//! [`SessionHandle`] at a time. Starting a scan while another is running
//! supersedes the old one: its cancel flag is raised before the new
//! session exists, so the "exactly one running session" invariant holds at
//! every observable point.
//!
//! All session state is mutated by a single spawned task. Cancellation is
//! cooperative: the task stops issuing new units once it observes the
//! flag, abandons whatever is still in flight and publishes the terminal
//! snapshot. Abandoned units never reach the aggregator, so no item is
//! emitted after the terminal state.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::time::Instant;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::{Notify, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use optiscan_common::config::ScanSettings;
use optiscan_common::error::ScanErrorKind;
use optiscan_common::network::target::TargetDescriptor;
use optiscan_common::plan::ScanPlan;
use optiscan_common::progress::{ProgressSnapshot, SessionStatus};
use optiscan_common::report::{DiscoveredItem, ToolInvocation, ToolOutcome};

use crate::progress::ProgressAggregator;
use crate::registry::ToolRegistry;
use crate::resolver;
use crate::stream::ResultStream;

mod units;

use units::UnitFeed;

/// Why a session was told to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The caller cancelled it.
    User,
    /// A newer session replaced it.
    Superseded,
}

impl CancelReason {
    fn terminal_status(self) -> SessionStatus {
        match self {
            CancelReason::User => SessionStatus::Cancelled,
            CancelReason::Superseded => SessionStatus::Superseded,
        }
    }
}

const CANCEL_NONE: u8 = 0;
const CANCEL_USER: u8 = 1;
const CANCEL_SUPERSEDED: u8 = 2;

/// One-shot cancellation signal shared between a handle and its session
/// task. The first request wins; later requests are ignored so a
/// supersede cannot repaint a user cancel (or vice versa).
struct CancelFlag {
    state: AtomicU8,
    notify: Notify,
}

impl CancelFlag {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(CANCEL_NONE),
            notify: Notify::new(),
        }
    }

    fn request(&self, reason: CancelReason) -> bool {
        let value = match reason {
            CancelReason::User => CANCEL_USER,
            CancelReason::Superseded => CANCEL_SUPERSEDED,
        };
        let won = self
            .state
            .compare_exchange(CANCEL_NONE, value, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            // notify_one leaves a permit behind, so the session task sees
            // the signal even if it is not parked on the Notify yet.
            self.notify.notify_one();
        }
        won
    }

    fn reason(&self) -> Option<CancelReason> {
        match self.state.load(Ordering::Acquire) {
            CANCEL_USER => Some(CancelReason::User),
            CANCEL_SUPERSEDED => Some(CancelReason::Superseded),
            _ => None,
        }
    }

    async fn wait(&self) {
        if self.reason().is_some() {
            return;
        }
        self.notify.notified().await;
    }
}

/// Caller-facing handle to one scan session.
///
/// Cheap to clone; all clones observe the same session. Progress arrives
/// as owned [`ProgressSnapshot`] values over a watch channel, items over
/// per-subscriber unbounded channels.
#[derive(Clone)]
pub struct SessionHandle {
    id: u64,
    plan: ScanPlan,
    cancel: Arc<CancelFlag>,
    progress: watch::Receiver<ProgressSnapshot>,
    stream: Arc<ResultStream>,
}

impl SessionHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn plan(&self) -> &ScanPlan {
        &self.plan
    }

    /// A fresh watch receiver for progress snapshots.
    pub fn progress(&self) -> watch::Receiver<ProgressSnapshot> {
        self.progress.clone()
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.progress.borrow().clone()
    }

    /// Subscribes to discovered items. Items emitted before this call are
    /// not replayed.
    pub fn subscribe(&self) -> UnboundedReceiver<DiscoveredItem> {
        self.stream.subscribe()
    }

    /// Requests user cancellation. In-flight units are abandoned; the
    /// session settles in `Cancelled` shortly after.
    pub fn cancel(&self) {
        self.cancel.request(CancelReason::User);
    }

    pub(crate) fn supersede(&self) {
        self.cancel.request(CancelReason::Superseded);
    }

    pub fn is_terminal(&self) -> bool {
        self.snapshot().status.is_terminal()
    }

    /// Waits for the terminal snapshot.
    pub async fn wait(&self) -> ProgressSnapshot {
        let mut rx = self.progress.clone();
        match rx.wait_for(|snap| snap.status.is_terminal()).await {
            Ok(snap) => snap.clone(),
            // Sender dropped; the last published snapshot is terminal.
            Err(_) => self.progress.borrow().clone(),
        }
    }

    /// Callback adapter over [`progress`](Self::progress): invokes `f` for
    /// the current snapshot and every subsequent publish, ending after the
    /// terminal one.
    pub fn on_progress<F>(&self, mut f: F) -> JoinHandle<()>
    where
        F: FnMut(ProgressSnapshot) + Send + 'static,
    {
        let mut rx = self.progress.clone();
        tokio::spawn(async move {
            loop {
                let snap = rx.borrow_and_update().clone();
                let terminal = snap.status.is_terminal();
                f(snap);
                if terminal || rx.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    /// Callback adapter over [`subscribe`](Self::subscribe): invokes `f`
    /// for every discovered item until the stream closes.
    pub fn on_result<F>(&self, mut f: F) -> JoinHandle<()>
    where
        F: FnMut(DiscoveredItem) + Send + 'static,
    {
        let mut rx = self.subscribe();
        tokio::spawn(async move {
            while let Some(item) = rx.recv().await {
                f(item);
            }
        })
    }
}

/// Owns the registry and enforces at-most-one-running-session.
pub struct Orchestrator {
    registry: Arc<ToolRegistry>,
    current: Mutex<Option<SessionHandle>>,
    next_session_id: AtomicU64,
}

impl Orchestrator {
    pub fn new(registry: ToolRegistry) -> Self {
        Self::with_registry(Arc::new(registry))
    }

    pub fn with_registry(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            current: Mutex::new(None),
            next_session_id: AtomicU64::new(1),
        }
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }

    /// One-shot tool invocation outside any session.
    pub async fn dispatch_once(&self, invocation: &ToolInvocation) -> ToolOutcome {
        self.registry.dispatch(invocation).await
    }

    /// Resolves `descriptor` and starts a new session with `tool_name`.
    ///
    /// Any session still running is superseded first, so exactly one
    /// session is running once this returns. Must be called from within a
    /// tokio runtime.
    pub fn start_scan(
        &self,
        descriptor: &TargetDescriptor,
        settings: ScanSettings,
        tool_name: &str,
    ) -> SessionHandle {
        let plan = resolver::resolve(descriptor, &settings);
        let id = self.next_session_id.fetch_add(1, Ordering::Relaxed);

        let mut slot = self.current.lock().unwrap();
        if let Some(previous) = slot.take()
            && !previous.is_terminal()
        {
            debug!(
                session = previous.id(),
                "superseding running session with session {id}"
            );
            previous.supersede();
        }

        let handle = SessionRunner::launch(id, Arc::clone(&self.registry), plan, settings, tool_name);
        *slot = Some(handle.clone());
        handle
    }

    /// Cancels the current session, if one is running. Returns whether a
    /// cancellation was actually requested.
    pub fn cancel_scan(&self) -> bool {
        let slot = self.current.lock().unwrap();
        match slot.as_ref() {
            Some(handle) if !handle.is_terminal() => {
                handle.cancel();
                true
            }
            _ => false,
        }
    }

    /// Handle of the most recently started session.
    pub fn current(&self) -> Option<SessionHandle> {
        self.current.lock().unwrap().clone()
    }
}

/// The single writer for one session's state. Lives on its own task from
/// launch to terminal transition.
struct SessionRunner {
    id: u64,
    registry: Arc<ToolRegistry>,
    plan: ScanPlan,
    settings: ScanSettings,
    tool_name: String,
    cancel: Arc<CancelFlag>,
    progress_tx: watch::Sender<ProgressSnapshot>,
    stream: Arc<ResultStream>,
    aggregator: ProgressAggregator,
}

impl SessionRunner {
    fn launch(
        id: u64,
        registry: Arc<ToolRegistry>,
        plan: ScanPlan,
        settings: ScanSettings,
        tool_name: &str,
    ) -> SessionHandle {
        let cancel = Arc::new(CancelFlag::new());
        let stream = Arc::new(ResultStream::new());
        let aggregator = ProgressAggregator::new(plan.unit_count, Arc::clone(&stream));
        let (progress_tx, progress_rx) = watch::channel(ProgressSnapshot::idle(plan.unit_count));

        let handle = SessionHandle {
            id,
            plan: plan.clone(),
            cancel: Arc::clone(&cancel),
            progress: progress_rx,
            stream: Arc::clone(&stream),
        };

        let runner = Self {
            id,
            registry,
            plan,
            settings,
            tool_name: tool_name.to_string(),
            cancel,
            progress_tx,
            stream,
            aggregator,
        };
        tokio::spawn(runner.run());

        handle
    }

    async fn run(mut self) {
        info!(
            session = self.id,
            tool = %self.tool_name,
            subject = %self.plan.resolved_subject,
            units = self.plan.unit_count,
            "scan session started"
        );
        self.publish(SessionStatus::Running, None);

        let feed = UnitFeed::new(&self.plan);
        let mut inflight: JoinSet<ToolOutcome> = JoinSet::new();
        let mut issued: u32 = 0;
        let mut last_error: Option<String> = None;

        let terminal = loop {
            if let Some(reason) = self.cancel.reason() {
                break reason.terminal_status();
            }

            while inflight.len() < self.settings.dispatch_width && issued < self.plan.unit_count {
                let invocation = ToolInvocation::new(&self.tool_name, feed.subject_for(issued))
                    .aggressive(self.settings.aggressive);
                let registry = Arc::clone(&self.registry);
                let deadline = self.settings.unit_timeout;
                inflight
                    .spawn(async move { registry.dispatch_within(&invocation, deadline).await });
                issued += 1;
            }

            if inflight.is_empty() {
                break SessionStatus::Completed;
            }

            tokio::select! {
                _ = self.cancel.wait() => continue,
                joined = inflight.join_next() => {
                    let outcome = match joined {
                        Some(Ok(outcome)) => outcome,
                        Some(Err(join_err)) => ToolOutcome::fail(
                            ScanErrorKind::WorkerFailure,
                            format!("unit task failed: {join_err}"),
                        ),
                        None => continue,
                    };

                    if let Some((kind, message)) =
                        self.aggregator.on_unit_complete(&self.tool_name, outcome)
                    {
                        debug!(session = self.id, %kind, "unit failed: {message}");
                        last_error = Some(format!("{kind}: {message}"));
                        if self.settings.escalate_unit_failures {
                            break SessionStatus::Failed;
                        }
                    }
                    self.publish(SessionStatus::Running, last_error.clone());
                }
            }
        };

        // Abandoned units are dropped on the floor: they never reach the
        // aggregator, so nothing is emitted past this point.
        inflight.abort_all();
        self.stream.close();
        self.finish(terminal, last_error);
    }

    fn publish(&self, status: SessionStatus, last_error: Option<String>) {
        let mut snap = self.aggregator.snapshot(status);
        snap.last_error = last_error;
        self.progress_tx.send_replace(snap);
    }

    fn finish(&self, status: SessionStatus, last_error: Option<String>) {
        let mut snap = self.aggregator.snapshot(status);
        snap.ended_at = Some(Instant::now());
        snap.last_error = last_error;
        self.progress_tx.send_replace(snap);

        match status {
            SessionStatus::Completed => info!(
                session = self.id,
                units = self.aggregator.units_completed(),
                items = self.aggregator.items_found(),
                "scan session completed"
            ),
            SessionStatus::Failed => warn!(session = self.id, "scan session failed"),
            _ => info!(session = self.id, %status, "scan session ended"),
        }
    }
}
