//! Simulated device/service probe.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use optiscan_common::report::{Discovery, ToolInvocation, ToolOutcome};
use optiscan_core::Tool;

use crate::vendors;

const SERVICE_PORTS: &[(u16, &str)] = &[
    (554, "rtsp"),
    (80, "http"),
    (8080, "http-alt"),
    (8000, "cam-mgmt"),
    (37777, "dvr-ctl"),
];

/// Probes one subject for an exposed device and fabricates what a real
/// probe would have found.
pub struct DeviceProbe;

#[async_trait]
impl Tool for DeviceProbe {
    fn name(&self) -> &str {
        "device-probe"
    }

    fn describe(&self) -> &str {
        "probe a host for exposed device services"
    }

    async fn invoke(&self, invocation: &ToolInvocation) -> anyhow::Result<ToolOutcome> {
        // Simulated network latency.
        tokio::time::sleep(Duration::from_millis(rand::random_range(3..25))).await;

        let hit_probability = if invocation.aggressive { 0.22 } else { 0.12 };
        if !rand::random_bool(hit_probability) {
            return Ok(ToolOutcome::miss());
        }

        let (port, service) = SERVICE_PORTS[rand::random_range(0..SERVICE_PORTS.len())];
        let vendor = vendors::guess_for_subject(&invocation.subject);
        debug!(subject = %invocation.subject, port, "probe hit");

        let discovery = Discovery::new(
            &invocation.subject,
            format!("{service} service exposed on :{port}"),
        )
        .with_detail("port", port.to_string())
        .with_detail("service", service)
        .with_detail("vendor", vendor.name);

        Ok(ToolOutcome::hit(discovery))
    }
}
