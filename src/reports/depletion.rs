//! Stock Depletion Report
//!
//! Projects how many days each product's stock lasts at recent consumption,
//! when it reaches the reorder level and when to place the next order.

use std::fmt;
use std::io::Write;

use chrono::{Days, NaiveDate};

use crate::display::report::{format_percentage, separator};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{lookback_start, FuelType, ShiftRecordId, TankCapacities};
use crate::services::{AggregatedDayTotals, AggregationService};
use crate::storage::Storage;

use super::stats;
use super::stock::StockReport;

/// Share of capacity an order should bring a product back up to
pub const REFILL_TARGET: f64 = 0.8;
/// Days of stock above reorder level still worth watching
pub const CAUTION_DAYS: f64 = 10.0;

/// Levels and timings the forecast works against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepletionThresholds {
    /// Stock below this share of capacity is critical
    pub minimum_percent: f64,
    /// Stock at or below this share should be reordered
    pub reorder_percent: f64,
    /// Days between placing an order and the tanker arriving
    pub lead_time_days: u32,
    pub safety_buffer_days: u32,
    /// Business days of consumption averaged
    pub lookback_days: u32,
}

impl Default for DepletionThresholds {
    fn default() -> Self {
        Self {
            minimum_percent: 15.0,
            reorder_percent: 20.0,
            lead_time_days: 3,
            safety_buffer_days: 2,
            lookback_days: 14,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StockStatus {
    Critical,
    Urgent,
    Warning,
    Caution,
    Good,
}

impl StockStatus {
    pub fn needs_order(&self) -> bool {
        matches!(self, Self::Critical | Self::Urgent | Self::Warning)
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Critical => "CRITICAL",
            Self::Urgent => "URGENT",
            Self::Warning => "WARNING",
            Self::Caution => "CAUTION",
            Self::Good => "GOOD",
        })
    }
}

/// Litres sold per trading day
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumptionPattern {
    pub data_points: usize,
    pub daily_average: f64,
    pub daily_median: f64,
    pub daily_max: f64,
    /// Larger of the 75th percentile and mean plus half a deviation
    pub conservative_daily: f64,
    /// Litres per day added to the daily rate each day
    pub slope: f64,
    /// Standard deviation as a percentage of the mean
    pub volatility_percent: f64,
}

impl ConsumptionPattern {
    fn from_litres(litres: &[f64]) -> Self {
        let average = stats::mean(litres);
        let std_dev = stats::population_std_dev(litres);
        Self {
            data_points: litres.len(),
            daily_average: average,
            daily_median: stats::median(litres),
            daily_max: stats::max(litres),
            conservative_daily: stats::percentile(litres, 75.0).max(average + 0.5 * std_dev),
            slope: stats::slope(litres),
            volatility_percent: if average > 0.0 {
                std_dev / average * 100.0
            } else {
                0.0
            },
        }
    }

    /// Average rate projected a week ahead along the fitted slope
    pub fn trend_adjusted_daily(&self) -> f64 {
        self.daily_average + self.slope * 7.0
    }
}

/// Days until the reorder level at different consumption rates
///
/// None when the rate is zero or negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepletionScenarios {
    pub average: Option<f64>,
    pub conservative: Option<f64>,
    pub peak: Option<f64>,
    pub trend_adjusted: Option<f64>,
}

/// Forecast for one product
#[derive(Debug, Clone, PartialEq)]
pub struct DepletionForecast {
    pub fuel_type: FuelType,
    pub level: f64,
    pub capacity: f64,
    pub percent: f64,
    pub consumption: ConsumptionPattern,
    pub scenarios: DepletionScenarios,
    /// Days until the minimum level at the conservative rate
    pub days_to_minimum: Option<f64>,
    pub status: StockStatus,
    /// Last day to order so the tanker lands before the reorder level
    pub order_by: Option<NaiveDate>,
    /// Litres that would bring the product back to the refill target
    pub suggested_order: f64,
}

fn days_until(level: f64, target: f64, daily_rate: f64) -> Option<f64> {
    (daily_rate > 0.0).then(|| ((level - target) / daily_rate).max(0.0))
}

/// Stock Depletion Report
#[derive(Debug, Clone)]
pub struct DepletionReport {
    pub as_of: NaiveDate,
    /// First business day of the consumption window
    pub window_start: NaiveDate,
    /// Entry the dips came from; None when no entry has dips
    pub source: Option<(ShiftRecordId, NaiveDate)>,
    pub thresholds: DepletionThresholds,
    pub forecasts: Vec<DepletionForecast>,
}

impl DepletionReport {
    /// Forecast from the latest dips and consumption up to `as_of`
    pub fn generate(
        storage: &Storage,
        capacities: &TankCapacities,
        as_of: NaiveDate,
        thresholds: DepletionThresholds,
    ) -> LedgerResult<Self> {
        let window_start = lookback_start(as_of, thresholds.lookback_days).ok_or_else(|| {
            LedgerError::Validation(format!(
                "Consumption window of {} days reaches before the earliest date",
                thresholds.lookback_days
            ))
        })?;

        let stock = StockReport::generate(storage, capacities, thresholds.minimum_percent)?;
        let days: Vec<AggregatedDayTotals> = AggregationService::new(storage)
            .aggregate_range(window_start, as_of)?
            .into_iter()
            .filter(|d| d.entry_count() > 0)
            .collect();

        let forecasts = stock
            .fuels
            .iter()
            .map(|fuel| {
                let litres: Vec<f64> = days
                    .iter()
                    .map(|d| {
                        d.shifts
                            .values()
                            .map(|s| s.fuel_line(fuel.fuel_type).quantity)
                            .sum::<f64>()
                    })
                    .collect();
                forecast(
                    fuel.fuel_type,
                    fuel.level,
                    fuel.capacity,
                    &litres,
                    as_of,
                    &thresholds,
                )
            })
            .collect();

        tracing::debug!(%window_start, %as_of, trading_days = days.len(), "stock depletion forecast");

        Ok(Self {
            as_of,
            window_start,
            source: stock.source,
            thresholds,
            forecasts,
        })
    }

    pub fn for_fuel(&self, fuel: FuelType) -> Option<&DepletionForecast> {
        self.forecasts.iter().find(|f| f.fuel_type == fuel)
    }

    /// Products that should be ordered now
    pub fn orders_due(&self) -> impl Iterator<Item = &DepletionForecast> {
        self.forecasts.iter().filter(|f| f.status.needs_order())
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();
        let days_cell = |days: Option<f64>| {
            days.map(|d| format!("{:.1}", d))
                .unwrap_or_else(|| "-".to_string())
        };

        output.push_str(&format!(
            "Stock Depletion as of {}\n",
            self.as_of.format("%Y-%m-%d")
        ));
        match self.source {
            Some((id, date)) => output.push_str(&format!(
                "Dips from {} ({}), consumption since {}\n",
                date.format("%Y-%m-%d"),
                id,
                self.window_start.format("%Y-%m-%d")
            )),
            None => {
                output.push_str("No tank dips recorded yet.\n");
                return output;
            }
        }
        output.push_str(&separator(92));
        output.push('\n');
        output.push_str(&format!(
            "{:<6} {:>9} {:>6} {:>9} {:>9} {:>8} {:>8} {:>8}  {:<9} {:>10}\n",
            "Fuel", "Stock L", "Fill", "Avg L/d", "Cons L/d", "Avg", "Cons", "Peak", "Status", "Order by"
        ));

        for f in &self.forecasts {
            output.push_str(&format!(
                "{:<6} {:>9.0} {:>6} {:>9.0} {:>9.0} {:>8} {:>8} {:>8}  {:<9} {:>10}\n",
                f.fuel_type,
                f.level,
                format_percentage(f.percent),
                f.consumption.daily_average,
                f.consumption.conservative_daily,
                days_cell(f.scenarios.average),
                days_cell(f.scenarios.conservative),
                days_cell(f.scenarios.peak),
                f.status,
                f.order_by
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".to_string())
            ));
        }

        output.push_str(&format!(
            "\nDays are until the reorder level ({} of capacity); lead time {} days.\n",
            format_percentage(self.thresholds.reorder_percent),
            self.thresholds.lead_time_days
        ));
        for f in self.orders_due() {
            output.push_str(&format!(
                "Order {}: about {:.0} L to reach {:.0}% of capacity\n",
                f.fuel_type,
                f.suggested_order,
                REFILL_TARGET * 100.0
            ));
        }

        output
    }

    /// Export the report to CSV format
    pub fn export_csv<W: Write>(&self, writer: &mut W) -> LedgerResult<()> {
        let days_cell = |days: Option<f64>| days.map(|d| format!("{:.1}", d)).unwrap_or_default();

        writeln!(
            writer,
            "fuel_type,level,capacity,percent,daily_average,conservative_daily,days_average,days_conservative,days_peak,days_trend_adjusted,days_to_minimum,status,order_by,suggested_order"
        )
        .map_err(|e| LedgerError::Export(e.to_string()))?;

        for f in &self.forecasts {
            writeln!(
                writer,
                "{},{:.1},{:.1},{:.1},{:.1},{:.1},{},{},{},{},{},{},{},{:.0}",
                f.fuel_type.code(),
                f.level,
                f.capacity,
                f.percent,
                f.consumption.daily_average,
                f.consumption.conservative_daily,
                days_cell(f.scenarios.average),
                days_cell(f.scenarios.conservative),
                days_cell(f.scenarios.peak),
                days_cell(f.scenarios.trend_adjusted),
                days_cell(f.days_to_minimum),
                f.status,
                f.order_by
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                f.suggested_order
            )
            .map_err(|e| LedgerError::Export(e.to_string()))?;
        }

        Ok(())
    }
}

fn forecast(
    fuel_type: FuelType,
    level: f64,
    capacity: f64,
    litres: &[f64],
    as_of: NaiveDate,
    thresholds: &DepletionThresholds,
) -> DepletionForecast {
    let consumption = ConsumptionPattern::from_litres(litres);
    let percent = if capacity > 0.0 {
        level / capacity * 100.0
    } else {
        0.0
    };
    let reorder_percent = thresholds.reorder_percent.max(thresholds.minimum_percent);
    let reorder_level = capacity * reorder_percent / 100.0;
    let minimum_level = capacity * thresholds.minimum_percent / 100.0;

    let scenarios = DepletionScenarios {
        average: days_until(level, reorder_level, consumption.daily_average),
        conservative: days_until(level, reorder_level, consumption.conservative_daily),
        peak: days_until(level, reorder_level, consumption.daily_max),
        trend_adjusted: days_until(level, reorder_level, consumption.trend_adjusted_daily()),
    };

    let warning_days = f64::from(thresholds.lead_time_days + thresholds.safety_buffer_days);
    let status = if percent <= thresholds.minimum_percent {
        StockStatus::Critical
    } else if percent <= reorder_percent {
        StockStatus::Urgent
    } else {
        match scenarios.conservative {
            Some(days) if days <= warning_days => StockStatus::Warning,
            Some(days) if days <= CAUTION_DAYS => StockStatus::Caution,
            _ => StockStatus::Good,
        }
    };

    let order_by = match status {
        StockStatus::Critical | StockStatus::Urgent => Some(as_of),
        _ => scenarios.conservative.and_then(|days| {
            let wait = (days - f64::from(thresholds.lead_time_days)).max(0.0).floor();
            as_of.checked_add_days(Days::new(wait as u64))
        }),
    };

    DepletionForecast {
        fuel_type,
        level,
        capacity,
        percent,
        scenarios,
        days_to_minimum: days_until(level, minimum_level, consumption.conservative_daily),
        consumption,
        status,
        order_by,
        suggested_order: (capacity * REFILL_TARGET - level).max(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::{FuelLine, Shift, ShiftRecord, TankId};
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

    fn close(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    /// Four days of 1000 L MS and 2000 L HSD, dips on the last day
    fn book_week(storage: &Storage) {
        for day in 1..=4 {
            let mut record = ShiftRecord::new(date(day), Shift::Day, "Ravi");
            record.ms = FuelLine::new(100.0, 1000.0);
            record.hsd = FuelLine::new(90.0, 2000.0);
            if day == 4 {
                record.tanks.set(TankId::Ms1, 6000.0);
                record.tanks.set(TankId::Ms2, 3000.0);
                record.tanks.set(TankId::Hsd1, 10000.0);
                record.tanks.set(TankId::Power1, 1000.0);
            }
            storage.shifts.upsert(record).unwrap();
        }
    }

    #[test]
    fn test_forecast_per_product() {
        let (_temp, storage) = create_test_storage();
        book_week(&storage);

        let report = DepletionReport::generate(
            &storage,
            &TankCapacities::default(),
            date(4),
            DepletionThresholds::default(),
        )
        .unwrap();
        assert_eq!(report.window_start, NaiveDate::from_ymd_opt(2025, 7, 22).unwrap());

        // 9000 L of 18000, reorder level 3600 L
        let ms = report.for_fuel(FuelType::Ms).unwrap();
        assert_eq!(ms.consumption.data_points, 4);
        assert_eq!(ms.consumption.daily_average, 1000.0);
        assert!(close(ms.scenarios.conservative, 5.4));
        assert!(close(ms.days_to_minimum, 6.3));
        assert_eq!(ms.status, StockStatus::Caution);
        assert_eq!(ms.order_by, Some(date(6)));
        assert!((ms.suggested_order - 5400.0).abs() < 1e-6);

        // 10000 L of 38000, reorder level 7600 L
        let hsd = report.for_fuel(FuelType::Hsd).unwrap();
        assert!(close(hsd.scenarios.average, 1.2));
        assert_eq!(hsd.status, StockStatus::Warning);
        assert_eq!(hsd.order_by, Some(date(4)));

        // 1000 L of 9000 and nothing sold
        let power = report.for_fuel(FuelType::Power).unwrap();
        assert_eq!(power.scenarios.average, None);
        assert_eq!(power.status, StockStatus::Critical);
        assert_eq!(power.order_by, Some(date(4)));

        let due: Vec<_> = report.orders_due().map(|f| f.fuel_type).collect();
        assert_eq!(due, vec![FuelType::Hsd, FuelType::Power]);
    }

    #[test]
    fn test_conservative_rate_uses_spread() {
        let pattern = ConsumptionPattern::from_litres(&[1000.0, 1000.0, 1000.0, 2000.0]);
        assert_eq!(pattern.daily_average, 1250.0);
        assert_eq!(pattern.daily_max, 2000.0);
        // p75 1250 against 1250 + 0.5 × 433
        assert!((pattern.conservative_daily - (1250.0 + 0.5 * 1875.0f64.sqrt() * 10.0)).abs() < 1e-6);
    }

    #[test]
    fn test_no_dips() {
        let (_temp, storage) = create_test_storage();
        let report = DepletionReport::generate(
            &storage,
            &TankCapacities::default(),
            date(4),
            DepletionThresholds::default(),
        )
        .unwrap();
        assert!(report.source.is_none());
        assert!(report.format_terminal().contains("No tank dips"));
    }

    #[test]
    fn test_window_before_earliest_date_is_an_error() {
        let (_temp, storage) = create_test_storage();
        let thresholds = DepletionThresholds {
            lookback_days: 30,
            ..DepletionThresholds::default()
        };
        let err = DepletionReport::generate(
            &storage,
            &TankCapacities::default(),
            NaiveDate::MIN,
            thresholds,
        )
        .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_csv_export() {
        let (_temp, storage) = create_test_storage();
        book_week(&storage);

        let report = DepletionReport::generate(
            &storage,
            &TankCapacities::default(),
            date(4),
            DepletionThresholds::default(),
        )
        .unwrap();
        let mut out = Vec::new();
        report.export_csv(&mut out).unwrap();
        let csv = String::from_utf8(out).unwrap();
        assert_eq!(csv.lines().count(), 4);
        assert!(csv.contains("MS,9000.0,18000.0,50.0,1000.0,1000.0,5.4,5.4,5.4,5.4,6.3,CAUTION,2025-08-06,5400"));
        assert!(csv.contains("POWER,1000.0,9000.0,11.1,0.0,0.0,,,,,,CRITICAL,2025-08-04,6200"));
    }
}
