//! Sales Trend Report
//!
//! Per-product and total daily sales over a period: average, spread, the
//! direction of a fitted line and the last week against the week before.

use std::fmt;
use std::io::Write;

use chrono::NaiveDate;

use crate::display::report::{format_percentage, separator};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{FuelType, Money};
use crate::services::{AggregatedDayTotals, AggregationService};
use crate::storage::Storage;

use super::stats;

/// Days compared in the recent-against-previous change
pub const COMPARISON_WINDOW: usize = 7;

/// Fitted daily change as a share of the mean
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    StrongDecline,
    ModerateDecline,
    Stable,
    ModerateGrowth,
    StrongGrowth,
}

impl TrendDirection {
    /// Classify a slope in rupees per day against the daily mean
    pub fn classify(slope: f64, mean: f64) -> Self {
        if mean == 0.0 {
            return Self::Stable;
        }
        let percent_per_day = slope / mean * 100.0;
        if percent_per_day < -2.0 {
            Self::StrongDecline
        } else if percent_per_day < -0.5 {
            Self::ModerateDecline
        } else if percent_per_day > 2.0 {
            Self::StrongGrowth
        } else if percent_per_day > 0.5 {
            Self::ModerateGrowth
        } else {
            Self::Stable
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::StrongDecline => "Strong decline",
            Self::ModerateDecline => "Moderate decline",
            Self::Stable => "Stable",
            Self::ModerateGrowth => "Moderate growth",
            Self::StrongGrowth => "Strong growth",
        })
    }
}

/// Coefficient of variation band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Volatility {
    Low,
    Medium,
    High,
    Extreme,
}

impl Volatility {
    pub fn classify(cv_percent: f64) -> Self {
        if cv_percent < 15.0 {
            Self::Low
        } else if cv_percent < 30.0 {
            Self::Medium
        } else if cv_percent < 50.0 {
            Self::High
        } else {
            Self::Extreme
        }
    }
}

impl fmt::Display for Volatility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Extreme => "Extreme",
        })
    }
}

/// Trend for one product, or all products when `fuel_type` is None
#[derive(Debug, Clone, PartialEq)]
pub struct SalesTrend {
    pub fuel_type: Option<FuelType>,
    /// Days with sales of this product
    pub data_points: usize,
    pub mean: Money,
    pub median: Money,
    pub std_dev: Money,
    pub cv_percent: f64,
    /// Rupees per selling day
    pub slope: f64,
    pub direction: TrendDirection,
    pub volatility: Volatility,
    /// Last week's average against the week before; None without a previous week
    pub recent_change_percent: Option<f64>,
}

impl SalesTrend {
    fn from_series(fuel_type: Option<FuelType>, values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mean = stats::mean(values);
        let cv = stats::coefficient_of_variation(values);
        let slope = stats::slope(values);

        Some(Self {
            fuel_type,
            data_points: values.len(),
            mean: Money::from_rupees_f64(mean),
            median: Money::from_rupees_f64(stats::median(values)),
            std_dev: Money::from_rupees_f64(stats::sample_std_dev(values)),
            cv_percent: cv,
            slope,
            direction: TrendDirection::classify(slope, mean),
            volatility: Volatility::classify(cv),
            recent_change_percent: recent_change(values),
        })
    }

    pub fn label(&self) -> &'static str {
        self.fuel_type.map(|f| f.code()).unwrap_or("TOTAL")
    }
}

/// Average of the last week against the up-to-a-week before it
fn recent_change(values: &[f64]) -> Option<f64> {
    let split = values.len().checked_sub(COMPARISON_WINDOW)?;
    let recent = &values[split..];
    let previous = &values[split.saturating_sub(COMPARISON_WINDOW)..split];
    if previous.is_empty() {
        return None;
    }
    let previous_mean = stats::mean(previous);
    if previous_mean == 0.0 {
        return None;
    }
    Some((stats::mean(recent) - previous_mean) / previous_mean * 100.0)
}

/// Positive daily figures in rupees, oldest first
fn series(days: &[AggregatedDayTotals], amount: impl Fn(&AggregatedDayTotals) -> Money) -> Vec<f64> {
    days.iter()
        .map(amount)
        .filter(|m| m.is_positive())
        .map(|m| m.as_rupees_f64())
        .collect()
}

/// Sales Trend Report
#[derive(Debug, Clone)]
pub struct SalesTrendReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// MS, HSD, POWER then the total; products never sold are left out
    pub trends: Vec<SalesTrend>,
}

impl SalesTrendReport {
    pub fn generate(storage: &Storage, start: NaiveDate, end: NaiveDate) -> LedgerResult<Self> {
        let days = AggregationService::new(storage).aggregate_range(start, end)?;
        Ok(Self::from_days(start, end, &days))
    }

    /// Only days with a positive figure count toward a series
    pub fn from_days(start: NaiveDate, end: NaiveDate, days: &[AggregatedDayTotals]) -> Self {
        let mut trends: Vec<SalesTrend> = FuelType::ALL
            .iter()
            .filter_map(|&fuel| {
                SalesTrend::from_series(Some(fuel), &series(days, |d| d.fuel_sales(fuel)))
            })
            .collect();
        trends.extend(SalesTrend::from_series(None, &series(days, |d| d.total_sales)));

        Self { start, end, trends }
    }

    pub fn total(&self) -> Option<&SalesTrend> {
        self.trends.iter().find(|t| t.fuel_type.is_none())
    }

    pub fn for_fuel(&self, fuel: FuelType) -> Option<&SalesTrend> {
        self.trends.iter().find(|t| t.fuel_type == Some(fuel))
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Sales Trends {} to {}\n",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        ));
        output.push_str(&separator(96));
        output.push('\n');

        if self.trends.is_empty() {
            output.push_str("No sales recorded in this period.\n");
            return output;
        }

        output.push_str(&format!(
            "{:<6} {:>5} {:>14} {:>14} {:>12}  {:<17} {:<10} {:>9}\n",
            "Fuel", "Days", "Avg/day", "Median", "Slope/day", "Trend", "Volatility", "Last 7d"
        ));
        for t in &self.trends {
            output.push_str(&format!(
                "{:<6} {:>5} {:>14} {:>14} {:>12.2}  {:<17} {:<10} {:>9}\n",
                t.label(),
                t.data_points,
                t.mean,
                t.median,
                t.slope,
                t.direction,
                format!("{} ({})", t.volatility, format_percentage(t.cv_percent)),
                t.recent_change_percent
                    .map(|p| format!("{:+.1}%", p))
                    .unwrap_or_else(|| "-".to_string())
            ));
        }

        output
    }

    /// Export the report to CSV format
    pub fn export_csv<W: Write>(&self, writer: &mut W) -> LedgerResult<()> {
        writeln!(
            writer,
            "fuel_type,data_points,mean,median,std_dev,cv_percent,slope,trend,volatility,recent_change_percent"
        )
        .map_err(|e| LedgerError::Export(e.to_string()))?;

        for t in &self.trends {
            writeln!(
                writer,
                "{},{},{:.2},{:.2},{:.2},{:.1},{:.2},{},{},{}",
                t.label(),
                t.data_points,
                t.mean.as_rupees_f64(),
                t.median.as_rupees_f64(),
                t.std_dev.as_rupees_f64(),
                t.cv_percent,
                t.slope,
                t.direction,
                t.volatility,
                t.recent_change_percent
                    .map(|p| format!("{:.1}", p))
                    .unwrap_or_default()
            )
            .map_err(|e| LedgerError::Export(e.to_string()))?;
        }

        Ok(())
    }
}
