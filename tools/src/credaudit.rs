//! Simulated credential audit.
//!
//! Works through the engine's prioritized candidate list for the subject's
//! guessed vendor and reports the first pair the simulated device
//! "accepts". The candidate ordering is deterministic; whether a given
//! pair is accepted is not.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use optiscan_common::report::{Discovery, ToolInvocation, ToolOutcome};
use optiscan_core::Tool;

use crate::creds;
use crate::vendors;

/// Per-candidate acceptance probability. Defaults are likelier to work
/// than derived variants.
const DEFAULT_ACCEPT: f64 = 0.08;
const VARIANT_ACCEPT: f64 = 0.03;

/// How many candidates to try before giving up on a target.
const MAX_ATTEMPTS: usize = 12;

pub struct CredAudit;

#[async_trait]
impl Tool for CredAudit {
    fn name(&self) -> &str {
        "cred-audit"
    }

    fn describe(&self) -> &str {
        "try prioritized factory credentials against a host"
    }

    async fn invoke(&self, invocation: &ToolInvocation) -> anyhow::Result<ToolOutcome> {
        let vendor = vendors::guess_for_subject(&invocation.subject);
        let candidates = creds::candidates_for(&invocation.subject, Some(vendor.name));

        let attempt_cap = if invocation.aggressive {
            candidates.len()
        } else {
            MAX_ATTEMPTS.min(candidates.len())
        };

        for (attempt, candidate) in candidates.iter().take(attempt_cap).enumerate() {
            // One simulated login round-trip per candidate.
            tokio::time::sleep(Duration::from_millis(rand::random_range(1..6))).await;

            let accept = if candidate.is_default {
                DEFAULT_ACCEPT
            } else {
                VARIANT_ACCEPT
            };
            if !rand::random_bool(accept) {
                continue;
            }

            debug!(
                subject = %invocation.subject,
                username = %candidate.username,
                "credential accepted"
            );
            let discovery = Discovery::new(
                &invocation.subject,
                format!("weak credentials '{}'", candidate.username),
            )
            .with_detail("username", &candidate.username)
            .with_detail("password", &candidate.password)
            .with_detail("attempts", (attempt + 1).to_string())
            .with_detail("vendor", vendor.name);

            return Ok(ToolOutcome::hit(discovery));
        }

        Ok(ToolOutcome::miss())
    }
}
