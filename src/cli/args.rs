//! Argument parsing shared by the command handlers

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{lookback_start, FuelType, Money};

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(field: &str, value: &str) -> LedgerResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        LedgerError::Validation(format!(
            "Invalid {} '{}'. Use YYYY-MM-DD",
            field, value
        ))
    })
}

pub fn parse_optional_date(field: &str, value: Option<&str>) -> LedgerResult<Option<NaiveDate>> {
    value.map(|v| parse_date(field, v)).transpose()
}

/// Parse a `YYYY-MM-DDTHH:MM[:SS]` timestamp
pub fn parse_timestamp(value: &str) -> LedgerResult<NaiveDateTime> {
    let value = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| {
            LedgerError::Validation(format!(
                "Invalid timestamp '{}'. Use YYYY-MM-DDTHH:MM[:SS]",
                value
            ))
        })
}

/// Timestamp argument, or the local wall clock
pub fn timestamp_or_now(value: Option<&str>) -> LedgerResult<NaiveDateTime> {
    match value {
        Some(v) => parse_timestamp(v),
        None => Ok(Local::now().naive_local()),
    }
}

pub fn parse_money(field: &str, value: &str) -> LedgerResult<Money> {
    Money::parse(value).map_err(|e| {
        LedgerError::Validation(format!("Invalid {} '{}': {}", field, value, e))
    })
}

pub fn parse_optional_money(field: &str, value: Option<&str>) -> LedgerResult<Option<Money>> {
    value.map(|v| parse_money(field, v)).transpose()
}

pub fn parse_fuel(value: &str) -> LedgerResult<FuelType> {
    value
        .parse()
        .map_err(|e: crate::models::fuel::FuelTypeParseError| LedgerError::Validation(e.to_string()))
}

/// Parse a `RATE:QUANTITY` pair, e.g. `102.50:1200`
pub fn parse_rate_quantity(fuel: FuelType, value: &str) -> LedgerResult<(FuelType, f64, f64)> {
    let invalid = || {
        LedgerError::Validation(format!(
            "Invalid {} sale '{}'. Use RATE:QUANTITY, e.g. 102.50:1200",
            fuel, value
        ))
    };
    let (rate, quantity) = value.split_once(':').ok_or_else(invalid)?;
    let rate: f64 = rate.trim().parse().map_err(|_| invalid())?;
    let quantity: f64 = quantity.trim().replace(',', "").parse().map_err(|_| invalid())?;
    Ok((fuel, rate, quantity))
}

/// Inclusive date range from optional bounds
///
/// A missing end defaults to `today`; a missing start to `days` days ending
/// at the end date.
pub fn resolve_range(
    from: Option<&str>,
    to: Option<&str>,
    today: NaiveDate,
    days: u32,
) -> LedgerResult<(NaiveDate, NaiveDate)> {
    let end = parse_optional_date("end date", to)?.unwrap_or(today);
    let start = match parse_optional_date("start date", from)? {
        Some(start) => start,
        None => lookback_start(end, days).ok_or_else(|| {
            LedgerError::Validation(format!("A {}-day range ending {} is out of range", days, end))
        })?,
    };
    if end < start {
        return Err(LedgerError::InvalidDateRange { start, end });
    }
    Ok((start, end))
}

/// Range filter only when at least one bound is given
pub fn optional_range(
    from: Option<&str>,
    to: Option<&str>,
) -> LedgerResult<Option<(NaiveDate, NaiveDate)>> {
    let start = parse_optional_date("start date", from)?;
    let end = parse_optional_date("end date", to)?;
    let range = match (start, end) {
        (None, None) => return Ok(None),
        (Some(start), Some(end)) => (start, end),
        (Some(start), None) => (start, NaiveDate::MAX),
        (None, Some(end)) => (NaiveDate::MIN, end),
    };
    if range.1 < range.0 {
        return Err(LedgerError::InvalidDateRange {
            start: range.0,
            end: range.1,
        });
    }
    Ok(Some(range))
}

/// Create `path` and hand a buffered writer to `write`
pub fn write_to_file<F>(path: &Path, write: F) -> LedgerResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> LedgerResult<()>,
{
    let file = File::create(path).map_err(|e| {
        LedgerError::Export(format!("Failed to create file {}: {}", path.display(), e))
    })?;
    let mut writer = BufWriter::new(file);
    write(&mut writer)?;
    writer
        .flush()
        .map_err(|e| LedgerError::Export(e.to_string()))
}
