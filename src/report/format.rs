//! Formatted terminal output: run summary and merged-series table.
//!
//! We keep formatting code in one place so:
//! - the projection code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::domain::{KpiSummary, MergedPoint};

/// Format the run summary (period, inputs, variance, status).
pub fn format_run_summary(summary: &KpiSummary, environment: &str, source: &str) -> String {
    let mut out = String::new();

    out.push_str("=== kpi - Freight Spend vs Budget ===\n");
    out.push_str(&format!("Environment: {environment}\n"));
    out.push_str(&format!("Source: {source}\n"));
    out.push_str(&format!(
        "Period: {} .. {} ({} elapsed, {} remaining)\n",
        summary.period_start, summary.period_end, summary.days_elapsed, summary.days_remaining
    ));
    out.push_str(&format!(
        "Last actual: {:.2} on {}\n",
        summary.last_actual, summary.last_actual_date
    ));
    out.push_str(&format!("Budget: {:.2}\n", summary.budget));

    let target_note = if summary.projected_is_run_rate { " (run-rate)" } else { "" };
    out.push_str(&format!("Projected: {:.2}{target_note}\n", summary.projected));

    match summary.daily_increment {
        Some(inc) => out.push_str(&format!(
            "Daily increment: {inc:.4} ({})\n",
            summary.accumulation.label()
        )),
        None => out.push_str("Daily increment: - (period complete)\n"),
    }

    let pct = summary
        .variance_pct
        .map(|p| format!(" ({p:+.1}%)"))
        .unwrap_or_default();
    out.push_str(&format!(
        "Variance: {:+.2}{pct} -> {}\n",
        summary.variance,
        summary.status.display_name()
    ));

    out
}

/// Format the merged series as a fixed-width table.
pub fn format_series_table(merged: &[MergedPoint]) -> String {
    let mut out = String::new();
    out.push_str(
        format!("{:<10} {:>10} {:>10} {:>10}", "date", "actual", "budget", "projected").trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<10} {:-<10} {:-<10} {:-<10}", "", "", "", "").trim_end());
    out.push('\n');

    for p in merged {
        out.push_str(
            format!(
                "{:<10} {:>10} {:>10} {:>10}",
                p.date.to_string(),
                fmt_cell(p.actual),
                fmt_cell(p.budget),
                fmt_cell(p.projected),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn fmt_cell(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.2}"),
        None => "-".to_string(),
    }
}
