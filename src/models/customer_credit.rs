//! Customer credit ledger entries
//!
//! Fleet and regular customers buy fuel on credit and settle later. Each
//! entry is either a credit sale (increases what the customer owes) or a
//! payment (reduces it).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::fuel::{FuelLine, FuelType};
use super::ids::CreditEntryId;
use super::money::Money;

/// Kind of credit ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditKind {
    Sale,
    Payment,
}

impl fmt::Display for CreditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sale => f.pad("Sale"),
            Self::Payment => f.pad("Payment"),
        }
    }
}

/// One line in a customer's credit ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerCreditEntry {
    pub id: CreditEntryId,
    pub customer_name: String,
    pub date: NaiveDate,
    pub kind: CreditKind,

    /// Product sold; None for payments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<FuelType>,

    /// Quantity and rate for sales; amount only for payments
    pub line: FuelLine,

    #[serde(default)]
    pub notes: String,

    pub created_at: DateTime<Utc>,
}

impl CustomerCreditEntry {
    /// A fuel sale on credit
    pub fn sale(
        customer_name: impl Into<String>,
        date: NaiveDate,
        fuel_type: FuelType,
        quantity: f64,
        rate: f64,
    ) -> Self {
        Self {
            id: CreditEntryId::new(),
            customer_name: customer_name.into(),
            date,
            kind: CreditKind::Sale,
            fuel_type: Some(fuel_type),
            line: FuelLine::new(rate, quantity),
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    /// A payment received from the customer
    pub fn payment(customer_name: impl Into<String>, date: NaiveDate, amount: Money) -> Self {
        Self {
            id: CreditEntryId::new(),
            customer_name: customer_name.into(),
            date,
            kind: CreditKind::Payment,
            fuel_type: None,
            line: FuelLine::with_amount(amount),
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    /// Absolute value of the entry
    pub fn total_amount(&self) -> Money {
        self.line.amount()
    }

    /// Effect on the customer's balance: sales add, payments subtract
    pub fn signed_amount(&self) -> Money {
        match self.kind {
            CreditKind::Sale => self.total_amount(),
            CreditKind::Payment => -self.total_amount(),
        }
    }

    pub fn validate(&self) -> Result<(), CreditValidationError> {
        if self.customer_name.trim().is_empty() {
            return Err(CreditValidationError::EmptyCustomer);
        }
        if self.kind == CreditKind::Sale && !(self.line.quantity > 0.0 && self.line.rate > 0.0) {
            return Err(CreditValidationError::IncompleteSale);
        }
        if !self.total_amount().is_positive() {
            return Err(CreditValidationError::NonPositiveAmount);
        }
        Ok(())
    }
}

/// Validation errors for credit entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreditValidationError {
    EmptyCustomer,
    IncompleteSale,
    NonPositiveAmount,
}

impl fmt::Display for CreditValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCustomer => write!(f, "Customer name cannot be empty"),
            Self::IncompleteSale => write!(f, "A credit sale needs a positive quantity and rate"),
            Self::NonPositiveAmount => write!(f, "Amount must be positive"),
        }
    }
}

impl std::error::Error for CreditValidationError {}
