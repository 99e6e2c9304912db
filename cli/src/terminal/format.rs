use crate::terminal::colors;
use colored::*;

use optiscan_common::progress::SessionStatus;
use optiscan_common::report::Discovery;

pub fn status_colored(status: SessionStatus) -> ColoredString {
    let text = status.to_string();
    match status {
        SessionStatus::Completed => text.green().bold(),
        SessionStatus::Failed => text.red().bold(),
        SessionStatus::Cancelled | SessionStatus::Superseded => text.yellow().bold(),
        SessionStatus::Idle | SessionStatus::Running => text.normal(),
    }
}

/// Converts a discovery payload into the key/value rows the tree printer
/// renders under an item head.
pub fn payload_details(payload: &Discovery) -> Vec<(String, ColoredString)> {
    let mut rows: Vec<(String, ColoredString)> =
        vec![("Finding".to_string(), payload.summary.color(colors::ACCENT))];

    for (key, value) in &payload.details {
        let mut label: String = key.clone();
        if let Some(first) = label.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        rows.push((label, value.color(colors::SUBJECT)));
    }
    rows
}

pub fn fmt_elapsed(elapsed: std::time::Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}
