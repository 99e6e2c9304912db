//! # Scan Target Model
//!
//! Defines the possible inputs for a scan session.
//!
//! This module handles parsing and representing target descriptors, which
//! can be:
//! * A single IP address (host).
//! * A CIDR block (e.g., `192.168.1.0/24`).
//! * A country keyword (e.g., `country:de`).
//! * A search-engine query (e.g., `shodan:port:554 country:US`).

use std::net::IpAddr;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// The search engines a query descriptor can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEngine {
    Shodan,
    Censys,
    Zoomeye,
}

impl SearchEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchEngine::Shodan => "shodan",
            SearchEngine::Censys => "censys",
            SearchEngine::Zoomeye => "zoomeye",
        }
    }

    fn from_prefix(s: &str) -> Option<Self> {
        match s {
            "shodan" => Some(SearchEngine::Shodan),
            "censys" => Some(SearchEngine::Censys),
            "zoomeye" => Some(SearchEngine::Zoomeye),
            _ => None,
        }
    }
}

/// Represents one target descriptor, immutable once parsed.
///
/// A descriptor only identifies *what* to scan. Turning it into a bounded
/// unit of work (with clamping and enumeration strategy) is the resolver's
/// job, so a `Cidr` variant may carry a prefix the resolver later decides
/// is unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetDescriptor {
    /// Scan a single specific host.
    Host { addr: IpAddr },
    /// Scan the address block `network/prefix`.
    Cidr { network: Ipv4Addr, prefix: u8 },
    /// Scan ranges registered for a two-letter country code.
    Country { code: String },
    /// Run a search-engine query and scan the result slots.
    Query { engine: SearchEngine, query: String },
}

impl std::fmt::Display for TargetDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetDescriptor::Host { addr } => write!(f, "{addr}"),
            TargetDescriptor::Cidr { network, prefix } => write!(f, "{network}/{prefix}"),
            TargetDescriptor::Country { code } => write!(f, "country:{code}"),
            TargetDescriptor::Query { engine, query } => {
                write!(f, "{}:{}", engine.as_str(), query)
            }
        }
    }
}

impl FromStr for TargetDescriptor {
    type Err = String;

    /// Parses a string into a `TargetDescriptor`.
    ///
    /// Supported formats:
    /// * **Host**: single IPv4/IPv6 address (e.g., "192.168.1.5").
    /// * **CIDR**: "Network/Prefix" (e.g., "192.168.1.0/24").
    /// * **Country**: "country:XX" (case-insensitive ISO code).
    /// * **Query**: "shodan:...", "censys:..." or "zoomeye:...".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty target".to_string());
        }

        if let Some(target) = parse_keyword(s)? {
            return Ok(target);
        }

        if let Some(target) = parse_host(s) {
            return Ok(target);
        }

        if let Some(target) = parse_cidr(s)? {
            return Ok(target);
        }

        Err(format!("invalid target: {s}"))
    }
}

/// Parses the prefixed keyword forms ("country:..", "shodan:..", ...).
fn parse_keyword(s: &str) -> Result<Option<TargetDescriptor>, String> {
    let Some((head, rest)) = s.split_once(':') else {
        return Ok(None);
    };

    let head_lower = head.to_ascii_lowercase();

    if head_lower == "country" {
        let code = rest.trim();
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(format!("invalid country code '{rest}'"));
        }
        return Ok(Some(TargetDescriptor::Country {
            code: code.to_ascii_uppercase(),
        }));
    }

    if let Some(engine) = SearchEngine::from_prefix(&head_lower) {
        let query = rest.trim();
        if query.is_empty() {
            return Err(format!("empty {head_lower} query"));
        }
        return Ok(Some(TargetDescriptor::Query {
            engine,
            query: query.to_string(),
        }));
    }

    // "::1" and friends fall through to the host parser.
    Ok(None)
}

/// Parses a single IP address.
fn parse_host(s: &str) -> Option<TargetDescriptor> {
    s.parse::<IpAddr>()
        .ok()
        .map(|addr| TargetDescriptor::Host { addr })
}

/// Parses CIDR notation like "192.168.1.0/24".
///
/// The prefix is accepted as any `u8`; prefixes above 32 are handed to the
/// resolver, which falls back to a single-unit plan rather than erroring.
fn parse_cidr(s: &str) -> Result<Option<TargetDescriptor>, String> {
    let Some((ip_str, prefix_str)) = s.split_once('/') else {
        return Ok(None);
    };

    let network = ip_str
        .parse::<Ipv4Addr>()
        .map_err(|e| format!("Invalid IP in CIDR '{ip_str}': {e}"))?;

    let prefix = prefix_str
        .parse::<u8>()
        .map_err(|e| format!("Invalid prefix in CIDR '{prefix_str}': {e}"))?;

    Ok(Some(TargetDescriptor::Cidr { network, prefix }))
}
