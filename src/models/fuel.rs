//! Fuel products and priced fuel lines
//!
//! Every derived amount in the ledger (shift sales, procurement invoices,
//! customer credit sales) goes through [`FuelLine`], so rate × quantity is
//! computed and rounded in exactly one place.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::money::Money;

/// Fuel products sold at the outlet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FuelType {
    /// Motor spirit (petrol)
    #[serde(rename = "MS", alias = "ms")]
    Ms,
    /// High speed diesel
    #[serde(rename = "HSD", alias = "hsd")]
    Hsd,
    /// Premium petrol
    #[serde(rename = "POWER", alias = "Power", alias = "power")]
    Power,
}

impl FuelType {
    /// All fuel types in display order
    pub const ALL: [FuelType; 3] = [FuelType::Ms, FuelType::Hsd, FuelType::Power];

    /// Upper-case code as stored by the records store
    pub fn code(&self) -> &'static str {
        match self {
            Self::Ms => "MS",
            Self::Hsd => "HSD",
            Self::Power => "POWER",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.code())
    }
}

impl FromStr for FuelType {
    type Err = FuelTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MS" | "PETROL" => Ok(Self::Ms),
            "HSD" | "DIESEL" => Ok(Self::Hsd),
            "POWER" | "XP" => Ok(Self::Power),
            _ => Err(FuelTypeParseError(s.to_string())),
        }
    }
}

/// Error returned when a fuel type label is not recognized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuelTypeParseError(pub String);

impl fmt::Display for FuelTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown fuel type '{}' (expected MS, HSD or POWER)", self.0)
    }
}

impl std::error::Error for FuelTypeParseError {}

/// A priced quantity of fuel: rate per litre, litres, and the derived amount
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FuelLine {
    /// Price per litre in rupees
    pub rate: f64,
    /// Volume in litres
    pub quantity: f64,
    amount: Money,
}

impl FuelLine {
    /// Create a line, deriving the amount from rate × quantity
    pub fn new(rate: f64, quantity: f64) -> Self {
        Self {
            rate,
            quantity,
            amount: derive_amount(rate, quantity),
        }
    }

    /// Create a line from a stored row that also carries an amount
    ///
    /// The amount is re-derived whenever both rate and quantity are present.
    /// Legacy rows that only recorded the amount keep it as-is.
    pub fn from_reported(rate: f64, quantity: f64, reported_amount: f64) -> Self {
        if rate != 0.0 && quantity != 0.0 {
            Self::new(rate, quantity)
        } else {
            Self {
                rate,
                quantity,
                amount: Money::from_rupees_f64(reported_amount),
            }
        }
    }

    /// A line that carries only an amount (e.g. a customer payment)
    pub fn with_amount(amount: Money) -> Self {
        Self {
            rate: 0.0,
            quantity: 0.0,
            amount,
        }
    }

    /// The sale or invoice amount for this line
    pub fn amount(&self) -> Money {
        self.amount
    }

    /// Field-wise sum of two lines (used when merging duplicate entries)
    ///
    /// The merged rate is the volume-weighted average so the merged amount
    /// stays the sum of the two amounts.
    pub fn merge(&self, other: &FuelLine) -> FuelLine {
        let quantity = self.quantity + other.quantity;
        let amount = self.amount + other.amount;
        let rate = if quantity != 0.0 {
            amount.as_rupees_f64() / quantity
        } else {
            0.0
        };
        FuelLine {
            rate,
            quantity,
            amount,
        }
    }

    /// True when no fuel was recorded on this line
    pub fn is_empty(&self) -> bool {
        self.quantity == 0.0 && self.amount.is_zero()
    }
}

/// Rate × quantity rounded to the paisa
pub fn derive_amount(rate: f64, quantity: f64) -> Money {
    Money::from_rupees_f64(rate * quantity)
}
