//! Per-session progress accounting.
//!
//! The aggregator is deliberately not shareable: it is owned by the
//! session task, which is the single writer for all session state, so
//! `on_unit_complete` calls are serialized by construction. Consumers read
//! progress exclusively through the owned snapshots the session publishes.

use std::sync::Arc;
use std::time::Instant;

use optiscan_common::error::ScanErrorKind;
use optiscan_common::progress::{ProgressSnapshot, SessionStatus};
use optiscan_common::report::ToolOutcome;

use crate::stream::ResultStream;

pub struct ProgressAggregator {
    unit_count: u32,
    units_completed: u32,
    items_found: u32,
    started_at: Instant,
    stream: Arc<ResultStream>,
}

impl ProgressAggregator {
    pub fn new(unit_count: u32, stream: Arc<ResultStream>) -> Self {
        Self {
            unit_count,
            units_completed: 0,
            items_found: 0,
            started_at: Instant::now(),
            stream,
        }
    }

    /// Accounts for one finished unit and forwards any discovery to the
    /// result stream. Returns the failure classification when the unit
    /// failed, so the session can apply its escalation policy.
    pub fn on_unit_complete(
        &mut self,
        source_tool: &str,
        outcome: ToolOutcome,
    ) -> Option<(ScanErrorKind, String)> {
        self.units_completed = (self.units_completed + 1).min(self.unit_count);

        match outcome {
            ToolOutcome::Ok {
                discovery: Some(payload),
            } => {
                self.items_found += 1;
                self.stream.emit(source_tool, payload);
                None
            }
            ToolOutcome::Ok { discovery: None } => None,
            ToolOutcome::Failed { kind, message } => Some((kind, message)),
        }
    }

    pub fn units_completed(&self) -> u32 {
        self.units_completed
    }

    pub fn items_found(&self) -> u32 {
        self.items_found
    }

    /// Materializes an owned snapshot for publication. The session fills
    /// in `ended_at`/`last_error` on terminal transitions.
    pub fn snapshot(&self, status: SessionStatus) -> ProgressSnapshot {
        ProgressSnapshot {
            status,
            units_completed: self.units_completed,
            unit_count: self.unit_count,
            items_found: self.items_found,
            started_at: self.started_at,
            ended_at: None,
            last_error: None,
        }
    }
}
