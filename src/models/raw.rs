//! Flat record shapes as read from and written to the records store
//!
//! Operator-entered data is often incomplete: numeric columns may be missing,
//! empty, `null` or hold text. Those are defaulted to zero here, once, so the
//! typed models never see an undefined value.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::business_day::Shift;
use super::fuel::{FuelLine, FuelType};
use super::money::Money;
use super::procurement::ProcurementRecord;
use super::shift_record::{Collections, ShiftRecord};
use super::tank::TankLevels;
use crate::error::{LedgerError, LedgerResult};

/// Numeric column: missing, empty, null or non-numeric values become 0
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(number_or_zero).unwrap_or(0.0))
}

fn number_or_zero(value: &serde_json::Value) -> f64 {
    let n = match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().replace(',', "").parse().unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// Text column: null and non-string values become an empty string or their text form
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

fn parse_store_date(field: &str, value: &str) -> LedgerResult<NaiveDate> {
    let value = value.trim();
    // Stores sometimes hand back full timestamps for date columns
    let date_part = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| {
        LedgerError::Validation(format!("Invalid {} '{}': expected YYYY-MM-DD", field, value))
    })
}

/// A shift record row with the store's column names
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawShiftRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub shift: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub manager: String,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub ms_rate: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ms_quantity: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ms_amount: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub hsd_rate: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub hsd_quantity: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub hsd_amount: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub power_rate: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub power_quantity: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub power_amount: f64,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub hsd1_tank: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub hsd2_tank: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ms1_tank: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ms2_tank: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub power1_tank: f64,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_outstanding: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub hpcl_payment: f64,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub cash_collections: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub card_collections: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub paytm_collections: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub hp_transactions: f64,

    #[serde(default, deserialize_with = "lenient_string")]
    pub manager_notes: String,

    /// Store insertion time, used to order entries on the same date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl RawShiftRecord {
    /// Convert to the typed model; only an unparseable date is an error
    pub fn into_record(self) -> LedgerResult<ShiftRecord> {
        let date = parse_store_date("date", &self.date)?;
        let mut record = ShiftRecord::new(date, Shift::from_label(&self.shift), self.manager);

        record.ms = FuelLine::from_reported(self.ms_rate, self.ms_quantity, self.ms_amount);
        record.hsd = FuelLine::from_reported(self.hsd_rate, self.hsd_quantity, self.hsd_amount);
        record.power =
            FuelLine::from_reported(self.power_rate, self.power_quantity, self.power_amount);

        record.tanks = TankLevels {
            hsd1: self.hsd1_tank,
            hsd2: self.hsd2_tank,
            ms1: self.ms1_tank,
            ms2: self.ms2_tank,
            power1: self.power1_tank,
        };

        record.collections = Collections {
            cash: Money::from_rupees_f64(self.cash_collections),
            card: Money::from_rupees_f64(self.card_collections),
            paytm: Money::from_rupees_f64(self.paytm_collections),
            hp_transactions: Money::from_rupees_f64(self.hp_transactions),
        };

        record.set_total_outstanding(Money::from_rupees_f64(self.total_outstanding));
        record.hpcl_payment = Money::from_rupees_f64(self.hpcl_payment);
        record.notes = self.manager_notes;

        if let Some(created_at) = self.created_at {
            record.created_at = created_at;
            record.updated_at = created_at;
        }

        Ok(record)
    }
}

impl From<&ShiftRecord> for RawShiftRecord {
    fn from(record: &ShiftRecord) -> Self {
        Self {
            date: record.date.format("%Y-%m-%d").to_string(),
            shift: record.shift.label().to_string(),
            manager: record.manager.clone(),
            ms_rate: record.ms.rate,
            ms_quantity: record.ms.quantity,
            ms_amount: record.ms.amount().as_rupees_f64(),
            hsd_rate: record.hsd.rate,
            hsd_quantity: record.hsd.quantity,
            hsd_amount: record.hsd.amount().as_rupees_f64(),
            power_rate: record.power.rate,
            power_quantity: record.power.quantity,
            power_amount: record.power.amount().as_rupees_f64(),
            hsd1_tank: record.tanks.hsd1,
            hsd2_tank: record.tanks.hsd2,
            ms1_tank: record.tanks.ms1,
            ms2_tank: record.tanks.ms2,
            power1_tank: record.tanks.power1,
            total_outstanding: record
                .reported_outstanding()
                .map(|m| m.as_rupees_f64())
                .unwrap_or(0.0),
            hpcl_payment: record.hpcl_payment.as_rupees_f64(),
            cash_collections: record.collections.cash.as_rupees_f64(),
            card_collections: record.collections.card.as_rupees_f64(),
            paytm_collections: record.collections.paytm.as_rupees_f64(),
            hp_transactions: record.collections.hp_transactions.as_rupees_f64(),
            manager_notes: record.notes.clone(),
            created_at: Some(record.created_at),
        }
    }
}

/// A procurement invoice row with the store's column names
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProcurementRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub invoice_number: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub invoice_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub fuel_type: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rate: f64,
    /// Ignored when quantity and rate are both present
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_amount: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vehicle_number: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub supplier: String,
}

impl RawProcurementRecord {
    /// Convert to the typed model; an unparseable date or fuel type is an error
    pub fn into_record(self) -> LedgerResult<ProcurementRecord> {
        let invoice_date = parse_store_date("invoice_date", &self.invoice_date)?;
        let fuel_type: FuelType = self
            .fuel_type
            .parse()
            .map_err(|e: super::fuel::FuelTypeParseError| LedgerError::Validation(e.to_string()))?;

        let mut record = ProcurementRecord::new(
            self.invoice_number.trim(),
            invoice_date,
            fuel_type,
            self.quantity,
            self.rate,
        );
        record.line = FuelLine::from_reported(self.rate, self.quantity, self.total_amount);
        record.vehicle_number = self.vehicle_number.trim().to_string();
        if !self.supplier.trim().is_empty() {
            record.supplier = self.supplier.trim().to_string();
        }
        Ok(record)
    }
}

impl From<&ProcurementRecord> for RawProcurementRecord {
    fn from(record: &ProcurementRecord) -> Self {
        Self {
            invoice_number: record.invoice_number.clone(),
            invoice_date: record.invoice_date.format("%Y-%m-%d").to_string(),
            fuel_type: record.fuel_type.code().to_string(),
            quantity: record.line.quantity,
            rate: record.line.rate,
            total_amount: record.total_amount().as_rupees_f64(),
            vehicle_number: record.vehicle_number.clone(),
            supplier: record.supplier.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_and_text_numbers_default_to_zero() {
        let raw: RawShiftRecord = serde_json::from_value(json!({
            "date": "2025-08-01",
            "shift": "Day",
            "manager": "Ravi",
            "ms_rate": "100",
            "ms_quantity": "abc",
            "ms_amount": null,
            "hsd_rate": 90.0,
            "hsd_quantity": "20",
            "cash_collections": "",
        }))
        .unwrap();

        assert_eq!(raw.ms_rate, 100.0);
        assert_eq!(raw.ms_quantity, 0.0);
        assert_eq!(raw.ms_amount, 0.0);
        assert_eq!(raw.power_rate, 0.0);
        assert_eq!(raw.cash_collections, 0.0);

        let record = raw.into_record().unwrap();
        assert_eq!(record.ms.amount(), Money::zero());
        assert_eq!(record.hsd.amount(), Money::from_rupees(1800));
        assert_eq!(record.total_collections(), Money::zero());
    }

    #[test]
    fn test_amount_only_rows_keep_reported_amount() {
        let raw: RawShiftRecord = serde_json::from_value(json!({
            "date": "2025-08-01",
            "shift": "Day",
            "ms_amount": 1000,
            "hsd_amount": 2000,
            "cash_collections": 2500,
            "card_collections": 400,
        }))
        .unwrap();

        let record = raw.into_record().unwrap();
        assert_eq!(record.total_sales(), Money::from_rupees(3000));
        assert_eq!(record.total_collections(), Money::from_rupees(2900));
    }

    #[test]
    fn test_zero_outstanding_is_not_reported() {
        let raw: RawShiftRecord = serde_json::from_value(json!({
            "date": "2025-08-01",
            "shift": "Night",
            "total_outstanding": 0,
        }))
        .unwrap();
        assert_eq!(raw.into_record().unwrap().reported_outstanding(), None);

        let raw: RawShiftRecord = serde_json::from_value(json!({
            "date": "2025-08-01",
            "shift": "Night",
            "total_outstanding": "5000",
        }))
        .unwrap();
        assert_eq!(
            raw.into_record().unwrap().reported_outstanding(),
            Some(Money::from_rupees(5000))
        );
    }

    #[test]
    fn test_unknown_shift_label_is_kept() {
        let raw: RawShiftRecord = serde_json::from_value(json!({
            "date": "2025-08-01",
            "shift": "Morning",
        }))
        .unwrap();
        let record = raw.into_record().unwrap();
        assert_eq!(record.shift, Shift::Unrecognized("Morning".into()));
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let raw = RawShiftRecord {
            date: "01/08/2025".into(),
            ..Default::default()
        };
        assert!(raw.into_record().unwrap_err().is_validation());
    }

    #[test]
    fn test_timestamp_date_column_accepted() {
        let raw = RawShiftRecord {
            date: "2025-08-01T00:00:00Z".into(),
            shift: "Day".into(),
            ..Default::default()
        };
        assert_eq!(
            raw.into_record().unwrap().date,
            NaiveDate::from_ymd_opt(2025, 8, 1).unwrap()
        );
    }

    #[test]
    fn test_procurement_row() {
        let raw: RawProcurementRecord = serde_json::from_value(json!({
            "invoice_number": "INV-1",
            "invoice_date": "2025-08-02",
            "fuel_type": "hsd",
            "quantity": "12000",
            "rate": 88.5,
            "total_amount": 1,
            "vehicle_number": "MH12AB1234",
            "supplier": "HPCL",
        }))
        .unwrap();

        let record = raw.into_record().unwrap();
        assert_eq!(record.fuel_type, FuelType::Hsd);
        assert_eq!(record.total_amount(), Money::from_rupees(1_062_000));

        let back = RawProcurementRecord::from(&record);
        assert_eq!(back.fuel_type, "HSD");
        assert_eq!(back.total_amount, 1_062_000.0);
    }

    #[test]
    fn test_procurement_unknown_fuel_rejected() {
        let raw = RawProcurementRecord {
            invoice_date: "2025-08-02".into(),
            fuel_type: "LPG".into(),
            ..Default::default()
        };
        assert!(raw.into_record().is_err());
    }
}
