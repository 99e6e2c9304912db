//! Result envelopes shared between the orchestration core and the tools.
//!
//! A tool only ever sees a [`ToolInvocation`] and answers with a
//! [`ToolOutcome`]; the core only ever inspects the envelope, never the
//! payload inside it.

use std::time::SystemTime;

use crate::error::ScanErrorKind;

/// One request handed to a tool through the registry.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    /// Registry key of the tool to run.
    pub tool_name: String,
    /// What this unit is aimed at: an address, a URL, or a query slot.
    pub subject: String,
    /// Mirrors the session setting; aggressive probes dig deeper.
    pub aggressive: bool,
}

impl ToolInvocation {
    pub fn new(tool_name: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            subject: subject.into(),
            aggressive: false,
        }
    }

    pub fn aggressive(mut self, aggressive: bool) -> Self {
        self.aggressive = aggressive;
        self
    }
}

/// Tool-defined payload of one discovery. Opaque to the core: it is carried
/// through the result stream untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    /// The subject the discovery was made against.
    pub subject: String,
    /// One-line human-readable summary.
    pub summary: String,
    /// Free-form key/value details for rendering.
    pub details: Vec<(String, String)>,
}

impl Discovery {
    pub fn new(subject: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            summary: summary.into(),
            details: Vec::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.push((key.into(), value.into()));
        self
    }
}

/// A discovery wrapped in the normalization envelope the result stream
/// emits. Never mutated after emission.
#[derive(Debug, Clone)]
pub struct DiscoveredItem {
    /// Process-wide monotonic id.
    pub id: u64,
    /// Name of the tool that produced the payload.
    pub source_tool: String,
    pub discovered_at: SystemTime,
    pub payload: Discovery,
}

/// The envelope every registry entry must satisfy.
///
/// `Ok` with no discovery is a completed unit that simply found nothing;
/// `Failed` records why a unit produced no usable answer. Neither variant
/// by itself ends a session.
#[derive(Debug, Clone)]
pub enum ToolOutcome {
    Ok { discovery: Option<Discovery> },
    Failed { kind: ScanErrorKind, message: String },
}

impl ToolOutcome {
    /// A unit that discovered something.
    pub fn hit(discovery: Discovery) -> Self {
        ToolOutcome::Ok {
            discovery: Some(discovery),
        }
    }

    /// A unit that completed without a discovery.
    pub fn miss() -> Self {
        ToolOutcome::Ok { discovery: None }
    }

    pub fn fail(kind: ScanErrorKind, message: impl Into<String>) -> Self {
        ToolOutcome::Failed {
            kind,
            message: message.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ToolOutcome::Failed { .. })
    }

    pub fn error_kind(&self) -> Option<ScanErrorKind> {
        match self {
            ToolOutcome::Ok { .. } => None,
            ToolOutcome::Failed { kind, .. } => Some(*kind),
        }
    }
}

/// One username/password pair the credential engine proposes for a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialCandidate {
    pub username: String,
    pub password: String,
    /// Whether this pair comes from a factory-default list.
    pub is_default: bool,
    /// Vendor whose profile contributed the pair, when known.
    pub vendor_affinity: Option<String>,
}

impl CredentialCandidate {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            is_default: false,
            vendor_affinity: None,
        }
    }

    pub fn default_cred(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            is_default: true,
            ..Self::new(username, password)
        }
    }

    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor_affinity = Some(vendor.into());
        self
    }
}
