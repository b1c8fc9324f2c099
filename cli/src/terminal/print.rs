use std::time::Duration;

use colored::*;
use unicode_width::UnicodeWidthStr;

use diagr_common::report::{BatchResult, BatchSummary, ReportRow};
use diagr_core::validator::RejectedEntry;

const HEADERS: [&str; 7] = ["NAME", "ADDRESS", "TYPE", "STATUS", "CHECKS", "METRICS", "DETAIL"];
const STATUS_COL: usize = 3;

pub fn header(title: &str) {
    println!();
    println!("{}", format!("--- {title} ---").bold());
}

/// Renders the sealed report as an aligned table, one machine per row in
/// input order.
pub fn report(result: &BatchResult) {
    header("Diagnostics Report");
    if result.is_empty() {
        println!("{}", "no machines ran".dimmed());
        return;
    }

    let rows = result.rows();
    let cells: Vec<[String; 7]> = rows.iter().map(row_cells).collect();

    let mut widths: [usize; 7] = HEADERS.map(|h| h.width());
    for row in &cells {
        for (col, cell) in row.iter().enumerate() {
            widths[col] = widths[col].max(cell.width());
        }
    }

    let header_line: Vec<String> = HEADERS
        .iter()
        .enumerate()
        .map(|(col, h)| pad(h, widths[col]))
        .collect();
    println!("{}", header_line.join("  ").dimmed().bold());

    for (row, cell_row) in rows.iter().zip(&cells) {
        let line: Vec<String> = cell_row
            .iter()
            .enumerate()
            .map(|(col, cell)| {
                let padded = pad(cell, widths[col]);
                if col == STATUS_COL {
                    paint_status(&row.status, padded).to_string()
                } else {
                    padded
                }
            })
            .collect();
        println!("{}", line.join("  "));
    }
}

pub fn rejected(rejected: &[RejectedEntry]) {
    if rejected.is_empty() {
        return;
    }
    let unit = if rejected.len() == 1 { "entry" } else { "entries" };
    println!();
    println!(
        "{}",
        format!("{} configuration {unit} rejected:", rejected.len())
            .yellow()
            .bold()
    );
    for entry in rejected {
        println!("  entry {}: {}", entry.index, entry.reason);
    }
}

pub fn summary(summary: &BatchSummary, total_time: Duration) {
    println!();
    let succeeded = format!("{} succeeded", summary.succeeded).green().bold();
    let failed = if summary.failed > 0 {
        format!("{} failed", summary.failed).red().bold()
    } else {
        "0 failed".normal()
    };
    let took = format!("{:.2}s", total_time.as_secs_f64()).yellow();
    println!(
        "{} machines: {succeeded}, {failed} in {took}",
        summary.total
    );

    for (kind, count) in &summary.failures_by_kind {
        println!("  {count} x {kind}");
    }
    if let Some(rate) = summary.check_pass_rate() {
        println!(
            "check pass rate: {rate:.2}% ({}/{})",
            summary.checks_passed, summary.checks_total
        );
    }
}

fn row_cells(row: &ReportRow) -> [String; 7] {
    let detail = if row.status == "error" {
        format!("{}: {}", row.error_kind, row.error_message)
    } else {
        row.detail.clone()
    };
    [
        row.name.clone(),
        row.ip_address.clone(),
        row.machine_type.clone(),
        row.status.clone(),
        row.checks.clone(),
        row.metrics.clone(),
        detail,
    ]
}

fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(s.width());
    format!("{s}{}", " ".repeat(fill))
}

fn paint_status(status: &str, padded: String) -> ColoredString {
    if status == "success" {
        padded.green()
    } else {
        padded.red()
    }
}
