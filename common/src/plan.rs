use crate::network::span::Ipv4Span;

/// How a plan walks its unit space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enumeration {
    /// Visit the address space in order; used when it fits the unit count.
    Sequential,
    /// Draw subjects from the space at random; used when the raw space was
    /// clamped, or when the space has no stable order (engine queries).
    Sampled,
}

/// A resolved, bounded unit of work for one session.
///
/// Produced once by the resolver and owned by the session for its whole
/// lifetime. `unit_count` is already clamped and is the hard upper bound
/// on `units_completed`.
#[derive(Debug, Clone)]
pub struct ScanPlan {
    /// How many units the session will issue, always at least 1.
    pub unit_count: u32,
    pub enumeration: Enumeration,
    /// Human-readable form of what the plan resolved to (an address, a
    /// CIDR block, or an engine query).
    pub resolved_subject: String,
    /// The concrete address space for range-style plans.
    pub span: Option<Ipv4Span>,
}

impl ScanPlan {
    /// Single-unit plan for one concrete subject. Also the fallback for
    /// descriptors the resolver cannot make sense of.
    pub fn single(subject: impl Into<String>) -> Self {
        Self {
            unit_count: 1,
            enumeration: Enumeration::Sequential,
            resolved_subject: subject.into(),
            span: None,
        }
    }
}
