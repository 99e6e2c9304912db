//! Simulated stream endpoint check.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use optiscan_common::report::{Discovery, ToolInvocation, ToolOutcome};
use optiscan_core::Tool;

use crate::vendors;

const CODECS: &[&str] = &["h264", "h265", "mjpeg"];
const RESOLUTIONS: &[&str] = &["704x576", "1280x720", "1920x1080", "2560x1440"];

/// Checks one subject for an openly reachable video stream.
pub struct StreamCheck;

#[async_trait]
impl Tool for StreamCheck {
    fn name(&self) -> &str {
        "stream-check"
    }

    fn describe(&self) -> &str {
        "check a host for an unauthenticated video stream"
    }

    async fn invoke(&self, invocation: &ToolInvocation) -> anyhow::Result<ToolOutcome> {
        tokio::time::sleep(Duration::from_millis(rand::random_range(5..35))).await;

        let hit_probability = if invocation.aggressive { 0.3 } else { 0.18 };
        if !rand::random_bool(hit_probability) {
            return Ok(ToolOutcome::miss());
        }

        let vendor = vendors::guess_for_subject(&invocation.subject);
        let path = vendor.stream_paths[rand::random_range(0..vendor.stream_paths.len())];
        let codec = CODECS[rand::random_range(0..CODECS.len())];
        let resolution = RESOLUTIONS[rand::random_range(0..RESOLUTIONS.len())];
        debug!(subject = %invocation.subject, path, "open stream");

        let discovery = Discovery::new(
            &invocation.subject,
            format!("open {codec} stream at {path}"),
        )
        .with_detail("path", path)
        .with_detail("codec", codec)
        .with_detail("resolution", resolution)
        .with_detail("vendor", vendor.name);

        Ok(ToolOutcome::hit(discovery))
    }
}
