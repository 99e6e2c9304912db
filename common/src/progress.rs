use std::time::{Duration, Instant};

/// Lifecycle states of a scan session.
///
/// `Idle` is the pre-start state; `Running` is the only active state; the
/// remaining four are terminal and absorbing. A session never leaves a
/// terminal state — a new scan means a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Running,
    Completed,
    Failed,
    Cancelled,
    /// Cancelled because a newer session started, distinct from a
    /// user-initiated cancel so consumers can tell the two apart.
    Superseded,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Idle | SessionStatus::Running)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Running => "running",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
            SessionStatus::Cancelled => "cancelled",
            SessionStatus::Superseded => "superseded",
        };
        f.write_str(s)
    }
}

/// Immutable progress snapshot republished on every unit completion and on
/// every state transition.
///
/// Consumers only ever see owned copies of this value, never a live
/// reference into session state, so there are no torn reads across
/// concurrent publishes. `units_completed` is monotonically non-decreasing
/// over the lifetime of a session and never exceeds `unit_count`.
#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    pub status: SessionStatus,
    pub units_completed: u32,
    pub unit_count: u32,
    pub items_found: u32,
    pub started_at: Instant,
    pub ended_at: Option<Instant>,
    pub last_error: Option<String>,
}

impl ProgressSnapshot {
    pub fn idle(unit_count: u32) -> Self {
        Self {
            status: SessionStatus::Idle,
            units_completed: 0,
            unit_count,
            items_found: 0,
            started_at: Instant::now(),
            ended_at: None,
            last_error: None,
        }
    }

    /// Wall time from start to the terminal transition, or to now while
    /// the session is still running.
    pub fn elapsed(&self) -> Duration {
        match self.ended_at {
            Some(end) => end.duration_since(self.started_at),
            None => self.started_at.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!SessionStatus::Idle.is_terminal());
        assert!(!SessionStatus::Running.is_terminal());
        assert!(SessionStatus::Completed.is_terminal());
        assert!(SessionStatus::Failed.is_terminal());
        assert!(SessionStatus::Cancelled.is_terminal());
        assert!(SessionStatus::Superseded.is_terminal());
    }
}
