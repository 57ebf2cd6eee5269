//! Formatting helpers shared by the terminal reports

use crate::models::{CompletionStatus, Money};
use crate::services::HpclOutstanding;

/// Variance with a short/excess hint; positive variance means cash is short
pub fn format_variance(variance: Money) -> String {
    if variance.is_positive() {
        format!("\x1b[31m{} short\x1b[0m", variance)
    } else if variance.is_negative() {
        format!("\x1b[32m{} excess\x1b[0m", variance.abs())
    } else {
        "balanced".to_string()
    }
}

/// Plain variance for fixed-width columns (no color codes)
pub fn variance_cell(variance: Money) -> String {
    if variance.is_zero() {
        "-".to_string()
    } else {
        variance.to_string()
    }
}

/// HPCL balance cell; carried-forward figures are starred
pub fn outstanding_cell(outstanding: &HpclOutstanding) -> String {
    match (outstanding.is_reported(), outstanding.is_carried_forward) {
        (false, _) => "n/a".to_string(),
        (true, true) => format!("{}*", outstanding.amount),
        (true, false) => outstanding.amount.to_string(),
    }
}

/// One-character marker for a day's completion status
pub fn status_marker(status: CompletionStatus) -> &'static str {
    match status {
        CompletionStatus::Complete => "✓",
        CompletionStatus::Partial => "½",
        CompletionStatus::Empty => "·",
    }
}

/// Money as a bare rupee figure for CSV cells
pub fn csv_amount(amount: Money) -> String {
    format!("{:.2}", amount.as_rupees_f64())
}

/// Quote a CSV cell when it contains a delimiter or quote
pub fn csv_text(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

pub fn format_percentage(pct: f64) -> String {
    if pct < 10.0 {
        format!("{:.1}%", pct)
    } else {
        format!("{:.0}%", pct)
    }
}

/// Fill bar for tank levels
pub fn format_bar(value: f64, max_value: f64, width: usize) -> String {
    if max_value <= 0.0 || value <= 0.0 {
        return "░".repeat(width);
    }

    let filled = ((value / max_value) * width as f64).round() as usize;
    let filled = filled.min(width);

    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

pub fn separator(width: usize) -> String {
    "─".repeat(width)
}

pub fn double_separator(width: usize) -> String {
    "═".repeat(width)
}

/// Truncate to `max_chars` characters with an ellipsis
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars <= 3 {
        ".".repeat(max_chars)
    } else {
        let head: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", head)
    }
}
