use std::time::Duration;

use anyhow::ensure;
use colored::*;
use indicatif::ProgressStyle;
use tracing::info_span;
use tracing_indicatif::span_ext::IndicatifSpanExt;

use optiscan_common::config::ScanSettings;
use optiscan_common::progress::{ProgressSnapshot, SessionStatus};
use optiscan_common::report::DiscoveredItem;
use optiscan_common::{error, info, success};
use optiscan_core::{Orchestrator, ToolRegistry};

use crate::commands::ScanArgs;
use crate::mprint;
use crate::terminal::{colors, format, input, print};

pub async fn scan(args: ScanArgs, quiet: bool) -> anyhow::Result<()> {
    let mut registry = ToolRegistry::new();
    optiscan_tools::register_builtin(&mut registry);
    ensure!(
        registry.get(&args.tool).is_some(),
        "unknown tool '{}', see `optiscan tools`",
        args.tool
    );

    let settings = ScanSettings {
        aggressive: args.aggressive,
        region_filter: (!args.regions.is_empty()).then(|| args.regions.clone()),
        max_units: args.max_units,
        dispatch_width: args.width.max(1),
        unit_timeout: Duration::from_millis(args.timeout_ms.max(1)),
        escalate_unit_failures: args.strict,
    };

    let orchestrator = Orchestrator::new(registry);
    let handle = orchestrator.start_scan(&args.target, settings, &args.tool);

    if !quiet {
        print::header(&format!("scanning {}", handle.plan().resolved_subject));
        info!(
            "{} units planned with '{}'",
            handle.plan().unit_count,
            args.tool
        );
    }

    let span = info_span!("scan", indicatif.pb_show = true);
    span.pb_set_style(
        &ProgressStyle::with_template(
            "{spinner:.green} {msg} [{bar:32.green/white}] {pos}/{len}",
        )
        .expect("static template"),
    );
    span.pb_set_length(u64::from(handle.plan().unit_count));
    let guard = span.enter();

    let listener = (!args.no_input).then(|| {
        let cancel_handle = handle.clone();
        input::listen(move || cancel_handle.cancel())
    });
    if listener.is_some() && !quiet {
        info!("press 'q' to cancel the session early");
    }

    let mut progress = handle.progress();
    let mut items = handle.subscribe();
    let mut items_open = true;
    let mut shown: usize = 0;

    loop {
        tokio::select! {
            changed = progress.changed() => {
                if changed.is_err() {
                    break;
                }
                let snap = progress.borrow_and_update().clone();
                span.pb_set_position(u64::from(snap.units_completed));
                span.pb_set_message(&format!("{} found", snap.items_found));
                if snap.status.is_terminal() {
                    break;
                }
            }
            item = items.recv(), if items_open => {
                match item {
                    Some(item) => {
                        print_item(&item, shown, quiet);
                        shown += 1;
                    }
                    None => items_open = false,
                }
            }
        }
    }

    // Whatever the session emitted before its terminal transition is
    // still queued; render it before the summary.
    while let Ok(item) = items.try_recv() {
        print_item(&item, shown, quiet);
        shown += 1;
    }

    drop(guard);
    if let Some(listener) = listener {
        listener.stop();
    }

    let snap = handle.wait().await;
    summary(&snap, quiet);
    Ok(())
}

fn print_item(item: &DiscoveredItem, idx: usize, quiet: bool) {
    if quiet {
        return;
    }
    mprint!();
    print::tree_head(idx, &item.payload.subject);

    let mut details: Vec<(String, ColoredString)> =
        vec![("Tool".to_string(), item.source_tool.color(colors::ACCENT))];
    details.extend(format::payload_details(&item.payload));
    print::as_tree_one_level(details);
}

fn summary(snap: &ProgressSnapshot, quiet: bool) {
    if snap.items_found == 0 && !quiet && snap.status == SessionStatus::Completed {
        print::no_results();
    }

    let status: ColoredString = format::status_colored(snap.status);
    let items: ColoredString = format!("{} items", snap.items_found).bold().green();
    let units: String = format!("{}/{} units", snap.units_completed, snap.unit_count);
    let elapsed: ColoredString = format::fmt_elapsed(snap.elapsed()).bold().yellow();

    if quiet {
        success!("{status}: {units}, {items} in {elapsed}");
        return;
    }

    mprint!();
    print::fat_separator();
    print::centerln(&format!(
        "Session {status}: {items} across {units} in {elapsed}"
    ));

    if let Some(last_error) = &snap.last_error {
        match snap.status {
            SessionStatus::Failed => error!("session error: {last_error}"),
            _ => info!("last unit error: {last_error}"),
        }
    }
}
