//! Anomaly Report
//!
//! Flags business days whose sales sit far from the period's mean, and days
//! where collections drift from sales by more than a tolerated share.

use std::fmt;
use std::io::Write;

use chrono::NaiveDate;

use crate::display::report::{csv_text, separator};
use crate::error::{LedgerError, LedgerResult};
use crate::models::Money;
use crate::services::{AggregatedDayTotals, AggregationService};
use crate::storage::Storage;

use super::stats;

/// Sales further than this many standard deviations from the mean are flagged
pub const SALES_SIGMA: f64 = 2.0;
/// Fewest trading days before sales are compared against the mean
pub const MIN_DAYS_FOR_SALES: usize = 5;
/// Collections off from sales by more than this percentage are flagged
pub const COLLECTION_VARIANCE_PERCENT: f64 = 15.0;
/// Above this percentage a collection gap is high severity
pub const HIGH_VARIANCE_PERCENT: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnomalyKind {
    HighSales,
    LowSales,
    CollectionVariance,
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::HighSales => "High sales",
            Self::LowSales => "Low sales",
            Self::CollectionVariance => "Collection variance",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Anomaly {
    pub date: NaiveDate,
    pub kind: AnomalyKind,
    pub severity: Severity,
    /// Day's sales for sales anomalies, collection gap in percent otherwise
    pub value: f64,
    pub description: String,
}

/// Anomaly Report
#[derive(Debug, Clone)]
pub struct AnomalyReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Days with at least one shift entry
    pub trading_days: usize,
    pub mean_sales: Money,
    pub sales_std_dev: Money,
    /// Most recent first
    pub anomalies: Vec<Anomaly>,
}

impl AnomalyReport {
    pub fn generate(storage: &Storage, start: NaiveDate, end: NaiveDate) -> LedgerResult<Self> {
        let days = AggregationService::new(storage).aggregate_range(start, end)?;
        Ok(Self::from_days(start, end, &days))
    }

    pub fn from_days(start: NaiveDate, end: NaiveDate, days: &[AggregatedDayTotals]) -> Self {
        let trading: Vec<&AggregatedDayTotals> =
            days.iter().filter(|d| d.entry_count() > 0).collect();
        let sales: Vec<f64> = trading
            .iter()
            .map(|d| d.total_sales.as_rupees_f64())
            .collect();

        let mean = stats::mean(&sales);
        let std_dev = stats::population_std_dev(&sales);
        let check_sales = trading.len() >= MIN_DAYS_FOR_SALES;

        let mut anomalies = Vec::new();
        for (day, &day_sales) in trading.iter().zip(&sales) {
            if check_sales && (day_sales - mean).abs() > SALES_SIGMA * std_dev {
                let (kind, side) = if day_sales > mean {
                    (AnomalyKind::HighSales, "above")
                } else {
                    (AnomalyKind::LowSales, "below")
                };
                anomalies.push(Anomaly {
                    date: day.date,
                    kind,
                    severity: Severity::Medium,
                    value: day_sales,
                    description: format!(
                        "Sales {} well {} the average of {}",
                        day.total_sales,
                        side,
                        Money::from_rupees_f64(mean)
                    ),
                });
            }

            if let Some(anomaly) = collection_gap(day) {
                anomalies.push(anomaly);
            }
        }

        // newest day first; stable, so sales stay ahead of collections
        anomalies.sort_by(|a, b| b.date.cmp(&a.date));

        Self {
            start,
            end,
            trading_days: trading.len(),
            mean_sales: Money::from_rupees_f64(mean),
            sales_std_dev: Money::from_rupees_f64(std_dev),
            anomalies,
        }
    }

    pub fn high_severity(&self) -> impl Iterator<Item = &Anomaly> {
        self.anomalies.iter().filter(|a| a.severity == Severity::High)
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Anomalies {} to {}\n",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        ));
        output.push_str(&format!(
            "{} trading days, average sales {} (σ {})\n",
            self.trading_days, self.mean_sales, self.sales_std_dev
        ));
        output.push_str(&separator(78));
        output.push('\n');

        if self.anomalies.is_empty() {
            output.push_str("Nothing unusual in this period.\n");
            return output;
        }

        for a in &self.anomalies {
            output.push_str(&format!(
                "{}  {:<6} {:<19}  {}\n",
                a.date.format("%Y-%m-%d"),
                a.severity,
                a.kind,
                a.description
            ));
        }

        if self.trading_days < MIN_DAYS_FOR_SALES {
            output.push_str(&format!(
                "\nSales checks need at least {} trading days.\n",
                MIN_DAYS_FOR_SALES
            ));
        }

        output
    }

    /// Export the report to CSV format
    pub fn export_csv<W: Write>(&self, writer: &mut W) -> LedgerResult<()> {
        writeln!(writer, "date,kind,severity,value,description")
            .map_err(|e| LedgerError::Export(e.to_string()))?;

        for a in &self.anomalies {
            writeln!(
                writer,
                "{},{},{},{:.2},{}",
                a.date.format("%Y-%m-%d"),
                csv_text(&a.kind.to_string()),
                a.severity,
                a.value,
                csv_text(&a.description)
            )
            .map_err(|e| LedgerError::Export(e.to_string()))?;
        }

        Ok(())
    }
}

/// Collections against sales for one day, when the gap is beyond tolerance
fn collection_gap(day: &AggregatedDayTotals) -> Option<Anomaly> {
    if !day.total_sales.is_positive() {
        return None;
    }
    let sales = day.total_sales.as_rupees_f64();
    let gap_percent = (day.total_collections.as_rupees_f64() - sales) / sales * 100.0;
    if gap_percent.abs() <= COLLECTION_VARIANCE_PERCENT {
        return None;
    }

    let severity = if gap_percent.abs() > HIGH_VARIANCE_PERCENT {
        Severity::High
    } else {
        Severity::Medium
    };
    Some(Anomaly {
        date: day.date,
        kind: AnomalyKind::CollectionVariance,
        severity,
        value: gap_percent,
        description: format!(
            "Collections {} are {:.1}% {} sales {}",
            day.total_collections,
            gap_percent.abs(),
            if gap_percent < 0.0 { "below" } else { "above" },
            day.total_sales
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::{FuelLine, Shift, ShiftRecord};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, day).unwrap()
    }

    /// MS sold at ₹100/L
    fn book(storage: &Storage, day: u32, litres: f64, cash: i64) {
        let mut record = ShiftRecord::new(date(day), Shift::Day, "Ravi");
        record.ms = FuelLine::new(100.0, litres);
        record.collections.cash = Money::from_rupees(cash);
        storage.shifts.upsert(record).unwrap();
    }

    #[test]
    fn test_flags_sales_outlier_and_collection_gaps() {
        let (_temp, storage) = create_test_storage();
        book(&storage, 1, 100.0, 10_000);
        book(&storage, 2, 100.0, 8_000);
        book(&storage, 3, 100.0, 10_000);
        book(&storage, 4, 400.0, 40_000);
        book(&storage, 5, 100.0, 7_000);
        book(&storage, 6, 100.0, 10_000);

        let report = AnomalyReport::generate(&storage, date(1), date(7)).unwrap();
        assert_eq!(report.trading_days, 6);
        assert_eq!(report.mean_sales, Money::from_rupees(15_000));

        let summary: Vec<_> = report
            .anomalies
            .iter()
            .map(|a| (a.date, a.kind, a.severity))
            .collect();
        assert_eq!(
            summary,
            vec![
                (date(5), AnomalyKind::CollectionVariance, Severity::High),
                (date(4), AnomalyKind::HighSales, Severity::Medium),
                (date(2), AnomalyKind::CollectionVariance, Severity::Medium),
            ]
        );
        assert!((report.anomalies[0].value + 30.0).abs() < 1e-9);
        assert_eq!(report.high_severity().count(), 1);
        assert!(report.anomalies[0]
            .description
            .contains("30.0% below sales ₹10000.00"));
    }

    #[test]
    fn test_sales_check_needs_enough_days() {
        let (_temp, storage) = create_test_storage();
        book(&storage, 1, 100.0, 10_000);
        book(&storage, 2, 100.0, 10_000);
        book(&storage, 3, 900.0, 90_000);

        let report = AnomalyReport::generate(&storage, date(1), date(3)).unwrap();
        assert!(report.anomalies.is_empty());
        assert!(report.format_terminal().contains("at least 5 trading days"));
    }

    #[test]
    fn test_small_gap_is_not_flagged() {
        let (_temp, storage) = create_test_storage();
        book(&storage, 1, 100.0, 8_600);

        let report = AnomalyReport::generate(&storage, date(1), date(1)).unwrap();
        assert!(report.anomalies.is_empty());
        assert!(report.format_terminal().contains("Nothing unusual"));
    }

    #[test]
    fn test_csv_export() {
        let (_temp, storage) = create_test_storage();
        book(&storage, 3, 100.0, 12_600);

        let report = AnomalyReport::generate(&storage, date(1), date(3)).unwrap();
        let mut out = Vec::new();
        report.export_csv(&mut out).unwrap();
        let csv = String::from_utf8(out).unwrap();
        assert!(csv.starts_with("date,kind,severity,value,description\n"));
        assert!(csv.contains("2025-08-03,Collection variance,high,26.00,"));
    }
}
