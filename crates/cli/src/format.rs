//! Report formatting (human and JSON).

use elision::AbortKind;

use crate::workload::Report;

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Format a finished run.
pub fn format_report(report: &Report, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(report)
            .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e)),
        OutputMode::Human => format_human(report),
    }
}

fn format_human(report: &Report) -> String {
    let mut lines = vec![
        format!(
            "adapter: {}  threads: {}  iterations: {}",
            report.adapter, report.threads, report.iterations
        ),
        format!(
            "counter: {} (expected {}){}",
            report.counter,
            report.expected,
            if report.lost_updates() {
                "  LOST UPDATES"
            } else {
                ""
            }
        ),
        format!(
            "outcomes: {} transactional, {} fallback, {} escaped",
            report.outcomes.transactional, report.outcomes.fallback, report.outcomes.escaped
        ),
    ];

    if let Some(stats) = &report.stats {
        lines.push(format!("stats: {}", stats.summary()));
        for kind in AbortKind::ALL {
            lines.push(format!("  {:<9} {}", kind.as_str(), stats.count(kind)));
        }
        lines.push(format!("  {:<9} {}", "lock-wait", stats.lock_waits));
    }

    lines.push(format!("elapsed: {:.3?}", report.elapsed));
    lines.join("\n")
}
