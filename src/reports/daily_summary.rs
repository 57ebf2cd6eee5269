//! Daily Summary Report
//!
//! One row per calendar date: sales, collections, variance, procurement,
//! the applicable HPCL balance and whether both shifts were entered.

use std::io::Write;

use chrono::NaiveDate;

use crate::display::report::{
    csv_amount, double_separator, outstanding_cell, separator, status_marker, variance_cell,
};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{CompletionStatus, Money};
use crate::services::{average_variance, AggregatedDayTotals, AggregationService};
use crate::storage::Storage;

/// Totals across the report range
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTotals {
    pub total_sales: Money,
    pub total_collections: Money,
    pub total_variance: Money,
    pub average_variance: Money,
    pub total_procurement: Money,
    pub hpcl_payments: Money,
    pub complete_days: usize,
    pub partial_days: usize,
    pub empty_days: usize,
}

impl SummaryTotals {
    fn from_days(days: &[AggregatedDayTotals]) -> Self {
        let count = |status| days.iter().filter(|d| d.completion == status).count();
        Self {
            total_sales: days.iter().map(|d| d.total_sales).sum(),
            total_collections: days.iter().map(|d| d.total_collections).sum(),
            total_variance: days.iter().map(|d| d.variance).sum(),
            average_variance: average_variance(days),
            total_procurement: days.iter().map(|d| d.total_procurement).sum(),
            hpcl_payments: days.iter().map(|d| d.hpcl_payments).sum(),
            complete_days: count(CompletionStatus::Complete),
            partial_days: count(CompletionStatus::Partial),
            empty_days: count(CompletionStatus::Empty),
        }
    }
}

/// Daily Summary Report
#[derive(Debug, Clone)]
pub struct DailySummaryReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Oldest first
    pub days: Vec<AggregatedDayTotals>,
    pub totals: SummaryTotals,
}

impl DailySummaryReport {
    /// Generate the report for `[start, end]`
    pub fn generate(storage: &Storage, start: NaiveDate, end: NaiveDate) -> LedgerResult<Self> {
        let days = AggregationService::new(storage).aggregate_range(start, end)?;
        Ok(Self::from_days(start, end, days))
    }

    /// Build from already-aggregated days
    pub fn from_days(start: NaiveDate, end: NaiveDate, days: Vec<AggregatedDayTotals>) -> Self {
        let totals = SummaryTotals::from_days(&days);
        Self {
            start,
            end,
            days,
            totals,
        }
    }

    /// Dates that had more than one entry for the same shift
    pub fn days_with_duplicates(&self) -> Vec<NaiveDate> {
        self.days
            .iter()
            .filter(|d| d.has_duplicates())
            .map(|d| d.date)
            .collect()
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();
        let width = 104;

        output.push_str(&format!(
            "Daily Summary: {} to {}\n",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        ));
        output.push_str(&double_separator(width));
        output.push('\n');

        output.push_str(&format!(
            "{:<12} {:>14} {:>14} {:>12} {:>14} {:>15}  {:<10}\n",
            "Date", "Sales", "Collections", "Variance", "Procurement", "HPCL O/S", "Status"
        ));
        output.push_str(&separator(width));
        output.push('\n');

        // Newest first on screen
        for day in self.days.iter().rev() {
            let mut status = format!("{} {}", status_marker(day.completion), day.completion);
            if !day.unrecognized_shifts.is_empty() {
                status.push_str(" ?");
            }
            output.push_str(&format!(
                "{:<12} {:>14} {:>14} {:>12} {:>14} {:>15}  {}\n",
                day.date.format("%Y-%m-%d").to_string(),
                day.total_sales,
                day.total_collections,
                variance_cell(day.variance),
                day.total_procurement,
                outstanding_cell(&day.hpcl_outstanding),
                status
            ));
        }

        output.push_str(&separator(width));
        output.push('\n');
        output.push_str(&format!(
            "{:<12} {:>14} {:>14} {:>12} {:>14}\n",
            "TOTAL",
            self.totals.total_sales,
            self.totals.total_collections,
            variance_cell(self.totals.total_variance),
            self.totals.total_procurement
        ));
        output.push('\n');
        output.push_str(&format!(
            "Average daily variance: {}\n",
            self.totals.average_variance
        ));
        output.push_str(&format!(
            "Days: {} complete, {} partial, {} empty\n",
            self.totals.complete_days, self.totals.partial_days, self.totals.empty_days
        ));
        output.push_str("* = HPCL balance carried forward from an earlier date\n");
        if self.days.iter().any(|d| !d.unrecognized_shifts.is_empty()) {
            output.push_str("? = entries with an unrecognized shift label\n");
        }

        output
    }

    /// Export the report to CSV format
    pub fn export_csv<W: Write>(&self, writer: &mut W) -> LedgerResult<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer
            .write_record([
                "date",
                "total_sales",
                "total_collections",
                "variance",
                "procurement",
                "hpcl_payments",
                "hpcl_outstanding",
                "outstanding_date",
                "carried_forward",
                "completion",
            ])
            .map_err(|e| LedgerError::Export(e.to_string()))?;

        for day in &self.days {
            let outstanding = &day.hpcl_outstanding;
            csv_writer
                .write_record([
                    day.date.format("%Y-%m-%d").to_string(),
                    csv_amount(day.total_sales),
                    csv_amount(day.total_collections),
                    csv_amount(day.variance),
                    csv_amount(day.total_procurement),
                    csv_amount(day.hpcl_payments),
                    csv_amount(outstanding.amount),
                    outstanding
                        .entry_date
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_default(),
                    outstanding.is_carried_forward.to_string(),
                    day.completion.to_string(),
                ])
                .map_err(|e| LedgerError::Export(e.to_string()))?;
        }

        csv_writer
            .flush()
            .map_err(|e| LedgerError::Export(e.to_string()))?;
        Ok(())
    }
}
