use std::time::Duration;

/// Knobs a caller can turn for one scan session.
///
/// The defaults mirror the non-aggressive dashboard profile: a 1024-unit
/// ceiling, eight units in flight and a lenient unit-failure policy.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Raises the plan ceiling from 1024 to 2048 units and makes the
    /// simulated tools probe harder.
    pub aggressive: bool,
    /// Restricts country resolution to ranges tagged with one of these
    /// region labels.
    pub region_filter: Option<Vec<String>>,
    /// Caller-supplied ceiling, applied on top of the mode ceiling.
    pub max_units: Option<u32>,
    /// How many unit dispatches may be in flight at once. Width 1 gives
    /// deterministic emission order.
    pub dispatch_width: usize,
    /// Per-invocation deadline; expiry resolves the unit as a timeout.
    pub unit_timeout: Duration,
    /// When set, a single failed unit ends the session as `Failed` instead
    /// of counting as a non-discovery.
    pub escalate_unit_failures: bool,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            aggressive: false,
            region_filter: None,
            max_units: None,
            dispatch_width: 8,
            unit_timeout: Duration::from_secs(2),
            escalate_unit_failures: false,
        }
    }
}

impl ScanSettings {
    /// The hard plan ceiling for the current mode, before `max_units`.
    pub fn ceiling(&self) -> u32 {
        if self.aggressive { 2048 } else { 1024 }
    }

    /// The effective ceiling a plan must never exceed.
    pub fn effective_ceiling(&self) -> u32 {
        match self.max_units {
            Some(max) => self.ceiling().min(max.max(1)),
            None => self.ceiling(),
        }
    }
}
