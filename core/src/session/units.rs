//! Derives per-unit subjects from a scan plan.

use optiscan_common::network::span::Ipv4Span;
use optiscan_common::plan::{Enumeration, ScanPlan};

/// Hands out one subject per unit index.
///
/// Sequential plans walk their span in address order; sampled plans draw
/// random addresses from it. Plans without a span (single hosts, engine
/// queries, estimates) fall back to the resolved subject, numbered when
/// the plan has more than one unit.
pub struct UnitFeed {
    enumeration: Enumeration,
    span: Option<Ipv4Span>,
    subject: String,
    unit_count: u32,
}

impl UnitFeed {
    pub fn new(plan: &ScanPlan) -> Self {
        Self {
            enumeration: plan.enumeration,
            span: plan.span,
            subject: plan.resolved_subject.clone(),
            unit_count: plan.unit_count,
        }
    }

    pub fn subject_for(&self, index: u32) -> String {
        match (self.enumeration, self.span) {
            (Enumeration::Sequential, Some(span)) => span
                .nth(u64::from(index))
                .map(|addr| addr.to_string())
                .unwrap_or_else(|| self.numbered(index)),
            (Enumeration::Sampled, Some(span)) => {
                let offset = rand::random_range(0..span.len());
                span.nth(offset)
                    .map(|addr| addr.to_string())
                    .unwrap_or_else(|| self.numbered(index))
            }
            (_, None) if self.unit_count == 1 => self.subject.clone(),
            (_, None) => self.numbered(index),
        }
    }

    fn numbered(&self, index: u32) -> String {
        format!("{}#{}", self.subject, index + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn plan(enumeration: Enumeration, span: Option<Ipv4Span>, unit_count: u32) -> ScanPlan {
        ScanPlan {
            unit_count,
            enumeration,
            resolved_subject: "10.0.0.0/30".to_string(),
            span,
        }
    }

    #[test]
    fn sequential_feed_walks_the_span() {
        let span = Ipv4Span::from_cidr(Ipv4Addr::new(10, 0, 0, 0), 30).unwrap();
        let feed = UnitFeed::new(&plan(Enumeration::Sequential, Some(span), 4));

        assert_eq!(feed.subject_for(0), "10.0.0.0");
        assert_eq!(feed.subject_for(3), "10.0.0.3");
    }

    #[test]
    fn sampled_feed_stays_inside_the_span() {
        let span = Ipv4Span::from_cidr(Ipv4Addr::new(192, 168, 4, 0), 24).unwrap();
        let feed = UnitFeed::new(&plan(Enumeration::Sampled, Some(span), 8));

        for i in 0..32 {
            let subject = feed.subject_for(i);
            let addr: Ipv4Addr = subject.parse().unwrap();
            assert!(span.contains(addr), "{subject} escaped the span");
        }
    }

    #[test]
    fn single_unit_plans_reuse_the_subject() {
        let feed = UnitFeed::new(&ScanPlan::single("203.0.113.9"));
        assert_eq!(feed.subject_for(0), "203.0.113.9");
    }

    #[test]
    fn spanless_multi_unit_plans_number_their_subjects() {
        let feed = UnitFeed::new(&ScanPlan {
            unit_count: 3,
            enumeration: Enumeration::Sampled,
            resolved_subject: "shodan:webcam".to_string(),
            span: None,
        });
        assert_eq!(feed.subject_for(0), "shodan:webcam#1");
        assert_eq!(feed.subject_for(2), "shodan:webcam#3");
    }
}
