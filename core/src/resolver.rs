//! Turns a target descriptor into a bounded scan plan.
//!
//! Resolution is pure and total: whatever the descriptor looks like, the
//! caller gets a usable plan back. Malformed CIDR prefixes fall back to a
//! single-unit plan, unknown country codes to a fixed estimate. The plan
//! ceiling is 2048 units in aggressive mode and 1024 otherwise, tightened
//! further by `max_units` when the caller set one.

use optiscan_common::config::ScanSettings;
use optiscan_common::network::span::Ipv4Span;
use optiscan_common::network::target::TargetDescriptor;
use optiscan_common::plan::{Enumeration, ScanPlan};
use optiscan_common::warn;

mod countries;

pub use countries::CountryRange;

/// Unit estimate for a country code with no registered ranges.
const UNKNOWN_COUNTRY_ESTIMATE: u32 = 64;

/// Resolves `descriptor` into a scan plan, never failing.
///
/// For non-range descriptors the unit count is a display heuristic, not an
/// exact count; for ranges it is the clamped size of the address space.
pub fn resolve(descriptor: &TargetDescriptor, settings: &ScanSettings) -> ScanPlan {
    match descriptor {
        TargetDescriptor::Host { addr } => ScanPlan::single(addr.to_string()),
        TargetDescriptor::Cidr { network, prefix } => resolve_cidr(*network, *prefix, settings),
        TargetDescriptor::Country { code } => resolve_country(code, settings),
        TargetDescriptor::Query { engine, query } => {
            // Engine queries are inherently unbounded; the plan size is a
            // bounded random estimate.
            ScanPlan {
                unit_count: rand::random_range(10..30),
                enumeration: Enumeration::Sampled,
                resolved_subject: format!("{}:{}", engine.as_str(), query),
                span: None,
            }
        }
    }
}

fn resolve_cidr(network: std::net::Ipv4Addr, prefix: u8, settings: &ScanSettings) -> ScanPlan {
    let span = match Ipv4Span::from_cidr(network, prefix) {
        Ok(span) => span,
        Err(_) => {
            warn!("unusable CIDR prefix /{prefix}, falling back to a single-unit plan");
            return ScanPlan::single(format!("{network}/{prefix}"));
        }
    };

    let raw_count: u64 = span.len();
    let ceiling: u32 = settings.effective_ceiling();
    let unit_count: u32 = raw_count.min(u64::from(ceiling)) as u32;

    // When the space was clamped, walking it in order would only ever touch
    // its head, so clamped plans sample instead.
    let enumeration = if raw_count <= u64::from(ceiling) {
        Enumeration::Sequential
    } else {
        Enumeration::Sampled
    };

    ScanPlan {
        unit_count: unit_count.max(1),
        enumeration,
        resolved_subject: format!("{}/{}", span.start_addr, prefix),
        span: Some(span),
    }
}

fn resolve_country(code: &str, settings: &ScanSettings) -> ScanPlan {
    let Some(ranges) = countries::ranges_for(code) else {
        warn!("no registered ranges for country '{code}', using a default estimate");
        return ScanPlan {
            unit_count: UNKNOWN_COUNTRY_ESTIMATE,
            enumeration: Enumeration::Sampled,
            resolved_subject: format!("country:{code}"),
            span: None,
        };
    };

    let eligible: Vec<&CountryRange> = match &settings.region_filter {
        Some(regions) => {
            let filtered: Vec<&CountryRange> = ranges
                .iter()
                .filter(|r| regions.iter().any(|want| want.eq_ignore_ascii_case(r.region)))
                .collect();
            // A filter that excludes every range is treated as no filter.
            if filtered.is_empty() {
                ranges.iter().collect()
            } else {
                filtered
            }
        }
        None => ranges.iter().collect(),
    };

    let picked = eligible[rand::random_range(0..eligible.len())];
    resolve_cidr(picked.network, picked.prefix, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn cidr(a: u8, b: u8, c: u8, d: u8, prefix: u8) -> TargetDescriptor {
        TargetDescriptor::Cidr {
            network: Ipv4Addr::new(a, b, c, d),
            prefix,
        }
    }

    #[test]
    fn host_resolves_to_one_unit() {
        let plan = resolve(
            &TargetDescriptor::Host {
                addr: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7)),
            },
            &ScanSettings::default(),
        );
        assert_eq!(plan.unit_count, 1);
        assert_eq!(plan.enumeration, Enumeration::Sequential);
        assert_eq!(plan.resolved_subject, "10.0.0.7");
    }

    #[test]
    fn slash_24_fits_the_default_ceiling() {
        let plan = resolve(&cidr(192, 168, 1, 0, 24), &ScanSettings::default());
        assert_eq!(plan.unit_count, 256);
        assert_eq!(plan.enumeration, Enumeration::Sequential);
        assert!(plan.span.is_some());
    }

    #[test]
    fn slash_8_clamps_to_the_aggressive_ceiling() {
        let settings = ScanSettings {
            aggressive: true,
            ..Default::default()
        };
        let plan = resolve(&cidr(10, 0, 0, 0, 8), &settings);
        assert_eq!(plan.unit_count, 2048);
        assert_eq!(plan.enumeration, Enumeration::Sampled);
    }

    #[test]
    fn every_valid_prefix_stays_under_the_ceiling() {
        for aggressive in [false, true] {
            let settings = ScanSettings {
                aggressive,
                ..Default::default()
            };
            for prefix in 0..=32 {
                let plan = resolve(&cidr(10, 0, 0, 0, prefix), &settings);
                assert!(
                    plan.unit_count <= settings.ceiling(),
                    "/{prefix} produced {} units over ceiling {}",
                    plan.unit_count,
                    settings.ceiling(),
                );
                assert!(plan.unit_count >= 1);
            }
        }
    }

    #[test]
    fn host_prefix_resolves_to_one_unit() {
        let plan = resolve(&cidr(10, 1, 2, 3, 32), &ScanSettings::default());
        assert_eq!(plan.unit_count, 1);
    }

    #[test]
    fn oversized_prefix_falls_back_to_single_unit() {
        for prefix in [33, 64, 255] {
            let plan = resolve(&cidr(10, 0, 0, 0, prefix), &ScanSettings::default());
            assert_eq!(plan.unit_count, 1, "/{prefix} should fall back");
            assert!(plan.span.is_none());
        }
    }

    #[test]
    fn max_units_tightens_the_clamp() {
        let settings = ScanSettings {
            max_units: Some(10),
            ..Default::default()
        };
        let plan = resolve(&cidr(192, 168, 0, 0, 16), &settings);
        assert_eq!(plan.unit_count, 10);
        assert_eq!(plan.enumeration, Enumeration::Sampled);
    }

    #[test]
    fn known_country_resolves_to_a_registered_range() {
        let plan = resolve(
            &TargetDescriptor::Country {
                code: "DE".to_string(),
            },
            &ScanSettings::default(),
        );
        assert!(plan.span.is_some());
        assert!(plan.unit_count <= 1024);
        assert!(plan.resolved_subject.contains('/'));
    }

    #[test]
    fn unknown_country_uses_the_default_estimate() {
        let plan = resolve(
            &TargetDescriptor::Country {
                code: "ZZ".to_string(),
            },
            &ScanSettings::default(),
        );
        assert_eq!(plan.unit_count, UNKNOWN_COUNTRY_ESTIMATE);
        assert!(plan.span.is_none());
    }

    #[test]
    fn region_filter_limits_country_ranges() {
        let settings = ScanSettings {
            region_filter: Some(vec!["eu".to_string()]),
            ..Default::default()
        };
        // All German ranges are tagged "eu", so the filter must not starve
        // resolution.
        for _ in 0..8 {
            let plan = resolve(
                &TargetDescriptor::Country {
                    code: "DE".to_string(),
                },
                &settings,
            );
            assert!(plan.span.is_some());
        }
    }

    #[test]
    fn engine_queries_estimate_within_bounds() {
        use optiscan_common::network::target::SearchEngine;

        for _ in 0..32 {
            let plan = resolve(
                &TargetDescriptor::Query {
                    engine: SearchEngine::Shodan,
                    query: "port:554".to_string(),
                },
                &ScanSettings::default(),
            );
            assert!((10..30).contains(&plan.unit_count));
            assert_eq!(plan.enumeration, Enumeration::Sampled);
            assert_eq!(plan.resolved_subject, "shodan:port:554");
        }
    }
}
