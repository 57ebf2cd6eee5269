//! Station settings for PumpLedger
//!
//! Manages station preferences: shift cutover times, tank capacities, report
//! defaults and display formatting.

use serde::{Deserialize, Serialize};

use super::paths::LedgerPaths;
use crate::error::LedgerError;
use crate::models::{ShiftSchedule, TankCapacities};

/// Station settings stored in config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Name shown in report headers
    #[serde(default = "default_station_name")]
    pub station_name: String,

    /// Currency symbol used in reports
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Day / night cutover times
    #[serde(default)]
    pub shift_schedule: ShiftSchedule,

    /// Capacity of each storage tank in litres
    #[serde(default)]
    pub tank_capacities: TankCapacities,

    /// Days of history used for averages on the dashboard
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    /// Tanks below this percentage of capacity are flagged
    #[serde(default = "default_low_stock_percent")]
    pub low_stock_percent: f64,

    /// Whether `init` has been run
    #[serde(default)]
    pub setup_completed: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_station_name() -> String {
    "Fuel Station".to_string()
}

fn default_currency() -> String {
    crate::models::money::RUPEE_SYMBOL.to_string()
}

fn default_lookback_days() -> u32 {
    30
}

/// Longest report lookback accepted from config.json, about ten years
pub const MAX_LOOKBACK_DAYS: u32 = 3660;

fn default_low_stock_percent() -> f64 {
    15.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            station_name: default_station_name(),
            currency_symbol: default_currency(),
            shift_schedule: ShiftSchedule::default(),
            tank_capacities: TankCapacities::default(),
            lookback_days: default_lookback_days(),
            low_stock_percent: default_low_stock_percent(),
            setup_completed: false,
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &LedgerPaths) -> Result<Self, LedgerError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| LedgerError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                LedgerError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            settings.validate()?;
            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &LedgerPaths) -> Result<(), LedgerError> {
        paths.ensure_directories()?;

        let settings_path = paths.settings_file();
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| LedgerError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(&settings_path, contents)
            .map_err(|e| LedgerError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Reject settings that would break business-day resolution
    pub fn validate(&self) -> Result<(), LedgerError> {
        let schedule = &self.shift_schedule;
        ShiftSchedule::new(schedule.day_start, schedule.night_start)
            .map_err(|e| LedgerError::Config(e.to_string()))?;

        if !(1..=MAX_LOOKBACK_DAYS).contains(&self.lookback_days) {
            return Err(LedgerError::Config(format!(
                "lookback_days must be between 1 and {} (got {})",
                MAX_LOOKBACK_DAYS, self.lookback_days
            )));
        }

        if !(0.0..=100.0).contains(&self.low_stock_percent) {
            return Err(LedgerError::Config(format!(
                "low_stock_percent must be between 0 and 100 (got {})",
                self.low_stock_percent
            )));
        }
        Ok(())
    }
}
