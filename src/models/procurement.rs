//! Procurement model
//!
//! A fuel delivery invoice from the supplier. Independent of shift entries;
//! the two are only joined by date in ledgers and daily summaries.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::fuel::{FuelLine, FuelType};
use super::ids::ProcurementId;
use super::money::Money;

/// Default supplier name for new invoices
pub const DEFAULT_SUPPLIER: &str = "HPCL";

/// A fuel-delivery invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcurementRecord {
    pub id: ProcurementId,

    /// Supplier invoice number
    pub invoice_number: String,

    pub invoice_date: NaiveDate,

    pub fuel_type: FuelType,

    /// Delivered litres and invoiced rate
    pub line: FuelLine,

    /// Tanker registration
    #[serde(default)]
    pub vehicle_number: String,

    #[serde(default = "default_supplier")]
    pub supplier: String,

    pub created_at: DateTime<Utc>,
}

fn default_supplier() -> String {
    DEFAULT_SUPPLIER.to_string()
}

impl ProcurementRecord {
    /// Create an invoice with the amount derived from quantity × rate
    pub fn new(
        invoice_number: impl Into<String>,
        invoice_date: NaiveDate,
        fuel_type: FuelType,
        quantity: f64,
        rate: f64,
    ) -> Self {
        Self {
            id: ProcurementId::new(),
            invoice_number: invoice_number.into(),
            invoice_date,
            fuel_type,
            line: FuelLine::new(rate, quantity),
            vehicle_number: String::new(),
            supplier: default_supplier(),
            created_at: Utc::now(),
        }
    }

    /// Invoice total
    pub fn total_amount(&self) -> Money {
        self.line.amount()
    }

    /// Key used to detect the same invoice line imported twice
    pub fn duplicate_key(&self) -> (String, FuelType) {
        (self.invoice_number.trim().to_ascii_uppercase(), self.fuel_type)
    }

    pub fn validate(&self) -> Result<(), ProcurementValidationError> {
        if self.invoice_number.trim().is_empty() {
            return Err(ProcurementValidationError::EmptyInvoiceNumber);
        }
        if !(self.line.quantity > 0.0) {
            return Err(ProcurementValidationError::NonPositiveQuantity(
                self.line.quantity,
            ));
        }
        if !(self.line.rate > 0.0) {
            return Err(ProcurementValidationError::NonPositiveRate(self.line.rate));
        }
        Ok(())
    }
}

impl fmt::Display for ProcurementRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} L of {}",
            self.invoice_number, self.invoice_date, self.line.quantity, self.fuel_type
        )
    }
}

/// Validation errors for procurement entries
#[derive(Debug, Clone, PartialEq)]
pub enum ProcurementValidationError {
    EmptyInvoiceNumber,
    NonPositiveQuantity(f64),
    NonPositiveRate(f64),
}

impl fmt::Display for ProcurementValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInvoiceNumber => write!(f, "Invoice number cannot be empty"),
            Self::NonPositiveQuantity(q) => write!(f, "Quantity must be positive (got {})", q),
            Self::NonPositiveRate(r) => write!(f, "Rate must be positive (got {})", r),
        }
    }
}

impl std::error::Error for ProcurementValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 2).unwrap()
    }

    #[test]
    fn test_total_amount() {
        let record = ProcurementRecord::new("INV-100", date(), FuelType::Ms, 9000.0, 100.25);
        assert_eq!(record.total_amount(), Money::from_paise(90_225_000));
        assert_eq!(record.supplier, "HPCL");
    }

    #[test]
    fn test_validation() {
        let record = ProcurementRecord::new("INV-100", date(), FuelType::Ms, 9000.0, 100.0);
        assert!(record.validate().is_ok());

        let record = ProcurementRecord::new(" ", date(), FuelType::Ms, 9000.0, 100.0);
        assert_eq!(
            record.validate(),
            Err(ProcurementValidationError::EmptyInvoiceNumber)
        );

        let record = ProcurementRecord::new("INV-1", date(), FuelType::Ms, 0.0, 100.0);
        assert!(matches!(
            record.validate(),
            Err(ProcurementValidationError::NonPositiveQuantity(_))
        ));

        let record = ProcurementRecord::new("INV-1", date(), FuelType::Ms, 10.0, -1.0);
        assert!(matches!(
            record.validate(),
            Err(ProcurementValidationError::NonPositiveRate(_))
        ));
    }

    #[test]
    fn test_duplicate_key_ignores_case() {
        let a = ProcurementRecord::new("inv-7", date(), FuelType::Hsd, 1.0, 1.0);
        let b = ProcurementRecord::new("INV-7 ", date(), FuelType::Hsd, 2.0, 2.0);
        let c = ProcurementRecord::new("INV-7", date(), FuelType::Ms, 2.0, 2.0);
        assert_eq!(a.duplicate_key(), b.duplicate_key());
        assert_ne!(a.duplicate_key(), c.duplicate_key());
    }
}
