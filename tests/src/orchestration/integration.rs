#![cfg(test)]
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::time::Duration;

use optiscan_common::config::ScanSettings;
use optiscan_common::progress::SessionStatus;
use optiscan_common::report::{Discovery, ToolOutcome};
use optiscan_core::{Orchestrator, ToolRegistry};

fn deterministic_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register_fn("always-hit", "deterministic test tool", |inv| async move {
        Ok(ToolOutcome::hit(Discovery::new(inv.subject, "found")))
    });
    registry.register_fn("slow-miss", "slow deterministic miss", |_inv| async move {
        tokio::time::sleep(Duration::from_millis(25)).await;
        Ok(ToolOutcome::miss())
    });
    registry
}

fn cidr(prefix: u8) -> optiscan_common::network::target::TargetDescriptor {
    optiscan_common::network::target::TargetDescriptor::Cidr {
        network: Ipv4Addr::new(10, 9, 0, 0),
        prefix,
    }
}

/// A full session over a small CIDR with a deterministic tool: every unit
/// completes, every hit is streamed, and the terminal snapshot agrees
/// with what the subscriber saw.
#[tokio::test]
async fn full_session_over_a_small_cidr() {
    let orchestrator = Orchestrator::new(deterministic_registry());
    let handle = orchestrator.start_scan(&cidr(28), ScanSettings::default(), "always-hit");
    let mut items = handle.subscribe();

    let snap = handle.wait().await;
    assert_eq!(snap.status, SessionStatus::Completed);
    assert_eq!(snap.unit_count, 16);
    assert_eq!(snap.units_completed, 16);
    assert_eq!(snap.items_found, 16);

    let mut received = 0;
    while let Some(item) = items.recv().await {
        assert_eq!(item.source_tool, "always-hit");
        received += 1;
    }
    assert_eq!(received, 16);
}

/// Parsed descriptor text drives the same path the CLI uses.
#[tokio::test]
async fn session_from_parsed_descriptor_text() {
    let descriptor =
        optiscan_common::network::target::TargetDescriptor::from_str("10.9.0.0/29").unwrap();

    let orchestrator = Orchestrator::new(deterministic_registry());
    let handle = orchestrator.start_scan(&descriptor, ScanSettings::default(), "always-hit");

    let snap = handle.wait().await;
    assert_eq!(snap.status, SessionStatus::Completed);
    assert_eq!(snap.units_completed, 8);
}

/// Cancelling mid-scan settles the session in `Cancelled` with partial
/// counts, and nothing further comes out of the stream.
#[tokio::test]
async fn cancel_mid_scan_emits_nothing_afterwards() {
    let orchestrator = Orchestrator::new(deterministic_registry());
    let settings = ScanSettings {
        dispatch_width: 1,
        ..Default::default()
    };
    let handle = orchestrator.start_scan(&cidr(26), settings, "slow-miss");

    tokio::time::sleep(Duration::from_millis(80)).await;
    handle.cancel();
    let snap = handle.wait().await;

    assert_eq!(snap.status, SessionStatus::Cancelled);
    assert!(snap.units_completed >= 1);
    assert!(snap.units_completed < snap.unit_count);

    // Terminal transition closed the stream; a subscriber drains what was
    // already delivered and then observes end-of-stream.
    let mut items = handle.subscribe();
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(items.recv().await.is_none());

    // Counts are frozen after the terminal snapshot.
    let later = handle.snapshot();
    assert_eq!(later.units_completed, snap.units_completed);
    assert_eq!(later.items_found, snap.items_found);
}

/// Starting a second scan supersedes the first: afterwards exactly one
/// session is live and the first never reports `Completed`.
#[tokio::test]
async fn supersede_leaves_exactly_one_running() {
    let orchestrator = Orchestrator::new(deterministic_registry());

    let first = orchestrator.start_scan(&cidr(26), ScanSettings::default(), "slow-miss");
    tokio::time::sleep(Duration::from_millis(40)).await;
    let second = orchestrator.start_scan(&cidr(30), ScanSettings::default(), "slow-miss");

    let first_snap = first.wait().await;
    assert_eq!(first_snap.status, SessionStatus::Superseded);

    let current = orchestrator.current().expect("a session must be tracked");
    assert_eq!(current.id(), second.id());

    let second_snap = second.wait().await;
    assert_eq!(second_snap.status, SessionStatus::Completed);
    assert_eq!(second_snap.units_completed, 4);
}

/// The built-in simulated tools run end to end through the registry: a
/// device-probe sweep completes and the stream delivers exactly the
/// number of items the snapshot counts.
#[tokio::test]
async fn builtin_probe_sweep_completes() {
    let mut registry = ToolRegistry::new();
    optiscan_tools::register_builtin(&mut registry);
    let orchestrator = Orchestrator::new(registry);

    let settings = ScanSettings {
        aggressive: true,
        ..Default::default()
    };
    let handle = orchestrator.start_scan(&cidr(27), settings, "device-probe");
    let mut items = handle.subscribe();

    let snap = handle.wait().await;
    assert_eq!(snap.status, SessionStatus::Completed);
    assert_eq!(snap.units_completed, 32);

    let mut received = 0;
    while let Some(_item) = items.recv().await {
        received += 1;
    }
    assert_eq!(received, snap.items_found);
}
