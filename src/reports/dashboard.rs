//! Station dashboard
//!
//! Snapshot of a single business day with the trailing variance average.

use chrono::NaiveDate;

use crate::config::settings::Settings;
use crate::display::report::{format_variance, outstanding_cell, separator, status_marker};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{lookback_start, BusinessDayWindow, CompletionStatus, FuelType, Money, Shift};
use crate::services::{average_variance, AggregatedDayTotals, AggregationService};
use crate::storage::Storage;

use super::stock::StockReport;

/// Dashboard for one business date
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub station_name: String,
    pub window: BusinessDayWindow,
    pub today: AggregatedDayTotals,
    pub lookback_start: NaiveDate,
    pub lookback_days: u32,
    pub average_variance: Money,
    /// Days in the lookback window with at least one shift missing
    pub incomplete_days: usize,
    pub low_tanks: usize,
}

impl Dashboard {
    pub fn generate(storage: &Storage, settings: &Settings, date: NaiveDate) -> LedgerResult<Self> {
        let lookback_days = settings.lookback_days.max(1);
        let lookback_start = lookback_start(date, lookback_days).ok_or_else(|| {
            LedgerError::Validation(format!(
                "A {}-day lookback from {} reaches before the earliest supported date",
                lookback_days, date
            ))
        })?;

        let mut days = AggregationService::new(storage).aggregate_range(lookback_start, date)?;
        let average = average_variance(&days);
        let incomplete_days = days
            .iter()
            .filter(|d| d.completion != CompletionStatus::Complete)
            .count();

        // aggregate_range always yields the end date last
        let today = match days.pop() {
            Some(day) => day,
            None => AggregationService::new(storage).aggregate_day(date)?,
        };

        let stock = StockReport::generate(
            storage,
            &settings.tank_capacities,
            settings.low_stock_percent,
        )?;

        Ok(Self {
            station_name: settings.station_name.clone(),
            window: settings.shift_schedule.describe_business_day(date),
            today,
            lookback_start,
            lookback_days,
            average_variance: average,
            incomplete_days,
            low_tanks: stock.low_tanks().count(),
        })
    }

    fn shift_state(&self, shift: &Shift) -> &'static str {
        if self.today.shift(shift).is_some() {
            "recorded"
        } else {
            "pending"
        }
    }

    /// Format the dashboard for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();
        let day = &self.today;

        output.push_str(&format!(
            "{} - business day {}\n",
            self.station_name,
            self.window.business_date.format("%Y-%m-%d")
        ));
        output.push_str(&format!(
            "{} to {}\n",
            self.window.shift_start.format("%Y-%m-%d %H:%M"),
            self.window.shift_end.format("%Y-%m-%d %H:%M")
        ));
        output.push_str(&separator(56));
        output.push('\n');

        output.push_str(&format!(
            "Status:        {} {}\n",
            status_marker(day.completion),
            day.completion
        ));
        output.push_str(&format!(
            "  {:<34} {}\n",
            self.window.day_shift_label,
            self.shift_state(&Shift::Day)
        ));
        output.push_str(&format!(
            "  {:<34} {}\n",
            self.window.night_shift_label,
            self.shift_state(&Shift::Night)
        ));
        if !day.unrecognized_shifts.is_empty() {
            output.push_str(&format!(
                "  Unrecognized shift labels: {}\n",
                day.unrecognized_shifts.join(", ")
            ));
        }
        output.push('\n');

        output.push_str(&format!("Fuel sales:    {:>14}\n", day.total_sales));
        for fuel in FuelType::ALL {
            let amount = day.fuel_sales(fuel);
            if !amount.is_zero() {
                output.push_str(&format!("  {:<11} {:>14}\n", fuel, amount));
            }
        }
        output.push_str(&format!("Collections:   {:>14}\n", day.total_collections));
        output.push_str(&format!(
            "Variance:      {:>14}\n",
            format_variance(day.variance)
        ));
        output.push_str(&format!("Procurement:   {:>14}\n", day.total_procurement));
        output.push('\n');

        let outstanding = &day.hpcl_outstanding;
        output.push_str(&format!(
            "HPCL outstanding: {}\n",
            outstanding_cell(outstanding)
        ));
        if outstanding.is_carried_forward {
            if let Some(from) = outstanding.entry_date {
                output.push_str(&format!(
                    "  carried forward from {}\n",
                    from.format("%Y-%m-%d")
                ));
            }
        }
        output.push('\n');

        output.push_str(&format!(
            "Average variance ({} days from {}): {}\n",
            self.lookback_days,
            self.lookback_start.format("%Y-%m-%d"),
            self.average_variance
        ));
        if self.incomplete_days > 0 {
            output.push_str(&format!(
                "Incomplete days in window: {}\n",
                self.incomplete_days
            ));
        }
        if self.low_tanks > 0 {
            output.push_str(&format!(
                "Tanks below stock threshold: {}\n",
                self.low_tanks
            ));
        }

        output
    }
}
