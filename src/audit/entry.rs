//! A single audit log line and the record it describes

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Types of operations that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Operation::Create => "CREATE",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
        };
        f.pad(label)
    }
}

/// Ledger records that are audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    ShiftRecord,
    Procurement,
    CustomerCredit,
    HpclPayment,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityType::ShiftRecord => "shift",
            EntityType::Procurement => "invoice",
            EntityType::CustomerCredit => "credit",
            EntityType::HpclPayment => "payment",
        };
        f.pad(label)
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shift" | "shifts" | "shift_record" => Ok(Self::ShiftRecord),
            "invoice" | "invoices" | "procurement" => Ok(Self::Procurement),
            "credit" | "customer_credit" => Ok(Self::CustomerCredit),
            "payment" | "payments" | "hpcl_payment" => Ok(Self::HpclPayment),
            _ => Err(format!(
                "Unknown record type '{}' (expected shift, invoice, credit or payment)",
                s
            )),
        }
    }
}

/// A ledger record that can be written to the audit log
///
/// The id and label are captured when the entry is written, so the log stays
/// readable after the record itself is deleted.
pub trait Audited: Serialize {
    const ENTITY_TYPE: EntityType;

    /// Short id as shown in listings, e.g. `shf-1a2b3c4d`
    fn audit_id(&self) -> String;

    /// Business date the record is booked against
    fn business_date(&self) -> NaiveDate;

    /// One-line description built from the record's figures
    fn audit_label(&self) -> String;
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the operation occurred (UTC)
    pub timestamp: DateTime<Utc>,

    pub operation: Operation,

    pub entity_type: EntityType,

    pub entity_id: String,

    /// Business date of the record; for updates, the date after the change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_date: Option<NaiveDate>,

    /// e.g. "2025-08-01 Day shift by Ravi, sales ₹3000.00"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    /// Record before the operation (updates and deletes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,

    /// Record after the operation (creates and updates)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<String>,
}

impl AuditEntry {
    fn describe<T: Audited>(operation: Operation, record: &T) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            entity_type: T::ENTITY_TYPE,
            entity_id: record.audit_id(),
            business_date: Some(record.business_date()),
            entity_name: Some(record.audit_label()),
            before: None,
            after: None,
            diff_summary: None,
        }
    }

    pub fn create<T: Audited>(record: &T) -> Self {
        Self {
            after: serde_json::to_value(record).ok(),
            ..Self::describe(Operation::Create, record)
        }
    }

    /// Update entry; the diff is computed from the serialized records
    pub fn update<T: Audited>(before: &T, after: &T) -> Self {
        let before_value = serde_json::to_value(before).ok();
        let after_value = serde_json::to_value(after).ok();
        let diff_summary = match (&before_value, &after_value) {
            (Some(b), Some(a)) => super::diff::generate_diff(b, a),
            _ => None,
        };
        Self {
            before: before_value,
            after: after_value,
            diff_summary,
            ..Self::describe(Operation::Update, after)
        }
    }

    pub fn delete<T: Audited>(record: &T) -> Self {
        Self {
            before: serde_json::to_value(record).ok(),
            ..Self::describe(Operation::Delete, record)
        }
    }

    /// Whether the entry touched a record booked on `date`, before or after
    /// the change
    pub fn touches_date(&self, date: NaiveDate) -> bool {
        if self.business_date == Some(date) {
            return true;
        }
        let booked_on = |value: &Option<serde_json::Value>| {
            value
                .as_ref()
                .and_then(booked_date)
                .is_some_and(|d| d == date)
        };
        booked_on(&self.before) || booked_on(&self.after)
    }

    /// Format the entry for the terminal, one change per indented line
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "{}  {:<6} {:<7} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.entity_type,
            self.entity_id
        );

        if let Some(name) = &self.entity_name {
            output.push_str("  ");
            output.push_str(name);
        }

        if let Some(diff) = &self.diff_summary {
            for change in diff.split(super::diff::CHANGE_SEPARATOR) {
                output.push_str("\n    ");
                output.push_str(change);
            }
        }

        output
    }
}

/// The booking date stored in a serialized record
fn booked_date(value: &serde_json::Value) -> Option<NaiveDate> {
    ["date", "invoice_date"]
        .iter()
        .find_map(|key| value.get(*key)?.as_str())
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        FuelLine, FuelType, HpclPayment, Money, PaymentMethod, ProcurementRecord, Shift,
        ShiftRecord,
    };

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, day).unwrap()
    }

    fn day_shift() -> ShiftRecord {
        let mut record = ShiftRecord::new(date(1), Shift::Day, "Ravi");
        record.ms = FuelLine::new(100.0, 30.0);
        record.collections.cash = Money::from_rupees(2500);
        record
    }

    #[test]
    fn test_create_entry_describes_shift() {
        let record = day_shift();
        let entry = AuditEntry::create(&record);

        assert_eq!(entry.operation, Operation::Create);
        assert_eq!(entry.entity_type, EntityType::ShiftRecord);
        assert_eq!(entry.entity_id, record.id.to_string());
        assert_eq!(entry.business_date, Some(date(1)));
        assert_eq!(
            entry.entity_name.as_deref(),
            Some("2025-08-01 Day shift by Ravi, sales ₹3000.00")
        );
        assert!(entry.before.is_none());
        assert!(entry.after.is_some());
    }

    #[test]
    fn test_update_entry_computes_diff() {
        let before = day_shift();
        let mut after = before.clone();
        after.collections.cash = Money::from_rupees(2600);

        let entry = AuditEntry::update(&before, &after);

        assert_eq!(entry.operation, Operation::Update);
        assert_eq!(
            entry.diff_summary.as_deref(),
            Some("collections.cash: ₹2500.00 -> ₹2600.00")
        );
    }

    #[test]
    fn test_moved_record_touches_both_dates() {
        let before = day_shift();
        let mut after = before.clone();
        after.date = date(2);

        let entry = AuditEntry::update(&before, &after);
        assert_eq!(entry.business_date, Some(date(2)));
        assert!(entry.touches_date(date(1)));
        assert!(entry.touches_date(date(2)));
        assert!(!entry.touches_date(date(3)));
    }

    #[test]
    fn test_delete_entry_keeps_label() {
        let mut payment = HpclPayment::new(date(4), Money::from_rupees(50_000), PaymentMethod::Cheque);
        payment.reference = Some("004512".into());

        let entry = AuditEntry::delete(&payment);
        assert!(entry.before.is_some());
        assert!(entry.after.is_none());
        assert_eq!(
            entry.entity_name.as_deref(),
            Some("₹50000.00 by Cheque on 2025-08-04, ref 004512")
        );
    }

    #[test]
    fn test_entity_type_names() {
        let json = serde_json::to_string(&EntityType::CustomerCredit).unwrap();
        assert_eq!(json, "\"customer_credit\"");
        assert_eq!("invoice".parse::<EntityType>().unwrap(), EntityType::Procurement);
        assert_eq!("Shift".parse::<EntityType>().unwrap(), EntityType::ShiftRecord);
        assert!("account".parse::<EntityType>().is_err());
    }

    #[test]
    fn test_human_readable_format() {
        let invoice = ProcurementRecord::new("INV-7", date(1), FuelType::Hsd, 12000.0, 88.5);
        let mut edited = invoice.clone();
        edited.line = FuelLine::new(88.5, 11000.0);
        edited.vehicle_number = "MH12AB1234".into();

        let formatted = AuditEntry::update(&invoice, &edited).format_human_readable();
        let mut lines = formatted.lines();
        let header = lines.next().unwrap();
        assert!(header.contains("UPDATE invoice"));
        assert!(header.contains(&invoice.id.to_string()));
        assert!(header.contains("INV-7 HSD 11000 L @ 88.50"));
        // quantity, derived amount and vehicle
        assert_eq!(lines.count(), 3);
    }
}
