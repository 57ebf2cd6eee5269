//! Tank Stock Report
//!
//! Latest dips against configured capacities.

use std::io::Write;

use chrono::NaiveDate;

use crate::display::report::{format_bar, format_percentage, separator};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{FuelType, ShiftRecordId, TankCapacities, TankId};
use crate::storage::Storage;

/// One tank's position
#[derive(Debug, Clone, PartialEq)]
pub struct TankStock {
    pub tank: TankId,
    pub level: f64,
    pub capacity: f64,
    pub percent: f64,
    pub low: bool,
}

/// Combined position for a product
#[derive(Debug, Clone, PartialEq)]
pub struct FuelStock {
    pub fuel_type: FuelType,
    pub level: f64,
    pub capacity: f64,
    pub percent: f64,
    pub low: bool,
}

/// Tank Stock Report
#[derive(Debug, Clone)]
pub struct StockReport {
    /// Entry the dips came from; None when no entry has dips
    pub source: Option<(ShiftRecordId, NaiveDate)>,
    pub tanks: Vec<TankStock>,
    pub fuels: Vec<FuelStock>,
    pub low_stock_percent: f64,
}

fn percent_of(level: f64, capacity: f64) -> f64 {
    if capacity > 0.0 {
        level / capacity * 100.0
    } else {
        0.0
    }
}

impl StockReport {
    /// Generate from the newest entry (by date, then creation time) that has dips
    pub fn generate(
        storage: &Storage,
        capacities: &TankCapacities,
        low_stock_percent: f64,
    ) -> LedgerResult<Self> {
        let latest = storage
            .shifts
            .get_all()?
            .into_iter()
            .filter(|r| !r.tanks.is_empty())
            .max_by(|a, b| {
                a.date
                    .cmp(&b.date)
                    .then_with(|| a.created_at.cmp(&b.created_at))
            });

        let levels = latest.as_ref().map(|r| r.tanks).unwrap_or_default();

        let tanks = TankId::ALL
            .iter()
            .map(|&tank| {
                let level = levels.get(tank);
                let capacity = capacities.get(tank);
                let percent = percent_of(level, capacity);
                TankStock {
                    tank,
                    level,
                    capacity,
                    percent,
                    low: percent < low_stock_percent,
                }
            })
            .collect();

        let fuels = FuelType::ALL
            .iter()
            .map(|&fuel_type| {
                let level = levels.total_for(fuel_type);
                let capacity = capacities.total_for(fuel_type);
                let percent = percent_of(level, capacity);
                FuelStock {
                    fuel_type,
                    level,
                    capacity,
                    percent,
                    low: percent < low_stock_percent,
                }
            })
            .collect();

        Ok(Self {
            source: latest.map(|r| (r.id, r.date)),
            tanks,
            fuels,
            low_stock_percent,
        })
    }

    pub fn low_tanks(&self) -> impl Iterator<Item = &TankStock> {
        self.tanks.iter().filter(|t| t.low)
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str("Tank Stock\n");
        match self.source {
            Some((id, date)) => output.push_str(&format!(
                "Dips from {} ({})\n",
                date.format("%Y-%m-%d"),
                id
            )),
            None => {
                output.push_str("No tank dips recorded yet.\n");
                return output;
            }
        }
        output.push_str(&separator(72));
        output.push('\n');

        for t in &self.tanks {
            output.push_str(&format!(
                "{:<8} {:>9.0} / {:>7.0} L  {} {:>5}{}\n",
                t.tank,
                t.level,
                t.capacity,
                format_bar(t.level, t.capacity, 20),
                format_percentage(t.percent),
                if t.low { "  LOW" } else { "" }
            ));
        }

        output.push_str(&separator(72));
        output.push('\n');
        for f in &self.fuels {
            output.push_str(&format!(
                "{:<8} {:>9.0} / {:>7.0} L  {:>5}{}\n",
                f.fuel_type,
                f.level,
                f.capacity,
                format_percentage(f.percent),
                if f.low { "  LOW" } else { "" }
            ));
        }
        output.push_str(&format!(
            "\nLOW = below {} of capacity\n",
            format_percentage(self.low_stock_percent)
        ));

        output
    }

    /// Export the report to CSV format
    pub fn export_csv<W: Write>(&self, writer: &mut W) -> LedgerResult<()> {
        writeln!(writer, "tank,fuel_type,level,capacity,percent,low")
            .map_err(|e| LedgerError::Export(e.to_string()))?;

        for t in &self.tanks {
            writeln!(
                writer,
                "{},{},{:.1},{:.1},{:.1},{}",
                t.tank,
                t.tank.fuel_type().code(),
                t.level,
                t.capacity,
                t.percent,
                t.low
            )
            .map_err(|e| LedgerError::Export(e.to_string()))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::{Shift, ShiftRecord};
    use chrono::{Duration, Utc};
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

    #[test]
    fn test_uses_latest_entry_with_dips() {
        let (_temp, storage) = create_test_storage();

        let mut old = ShiftRecord::new(date(1), Shift::Night, "Ravi");
        old.tanks.set(TankId::Hsd1, 15000.0);
        storage.shifts.upsert(old).unwrap();

        let mut newer = ShiftRecord::new(date(2), Shift::Day, "Suresh");
        newer.tanks.set(TankId::Hsd1, 8000.0);
        newer.tanks.set(TankId::Ms1, 900.0);
        newer.created_at = Utc::now() - Duration::minutes(5);
        let newer_id = newer.id;
        storage.shifts.upsert(newer).unwrap();

        // Latest entry has no dips and is skipped
        storage
            .shifts
            .upsert(ShiftRecord::new(date(2), Shift::Night, "Ravi"))
            .unwrap();

        let report = StockReport::generate(&storage, &TankCapacities::default(), 15.0).unwrap();
        assert_eq!(report.source, Some((newer_id, date(2))));

        let hsd1 = &report.tanks[0];
        assert_eq!(hsd1.tank, TankId::Hsd1);
        assert_eq!(hsd1.percent, 50.0);
        assert!(!hsd1.low);

        let ms1 = report.tanks.iter().find(|t| t.tank == TankId::Ms1).unwrap();
        assert!(ms1.low);

        let hsd = &report.fuels[1];
        assert_eq!(hsd.fuel_type, FuelType::Hsd);
        assert_eq!(hsd.level, 8000.0);
        assert_eq!(hsd.capacity, 38000.0);
    }

    #[test]
    fn test_no_dips() {
        let (_temp, storage) = create_test_storage();
        let report = StockReport::generate(&storage, &TankCapacities::default(), 15.0).unwrap();
        assert!(report.source.is_none());
        assert!(report.format_terminal().contains("No tank dips"));
    }

    #[test]
    fn test_csv_export() {
        let (_temp, storage) = create_test_storage();
        let mut record = ShiftRecord::new(date(1), Shift::Day, "Ravi");
        record.tanks.set(TankId::Power1, 4500.0);
        storage.shifts.upsert(record).unwrap();

        let report = StockReport::generate(&storage, &TankCapacities::default(), 15.0).unwrap();
        let mut out = Vec::new();
        report.export_csv(&mut out).unwrap();
        let csv = String::from_utf8(out).unwrap();
        assert!(csv.contains("POWER-1,POWER,4500.0,9000.0,50.0,false"));
    }
}
