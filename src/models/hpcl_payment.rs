//! Direct payments made to HPCL against the station's credit account

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::PaymentId;
use super::money::Money;

/// How a supplier payment was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    BankTransfer,
    Cheque,
    Cash,
    Upi,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::BankTransfer => "Bank Transfer",
            Self::Cheque => "Cheque",
            Self::Cash => "Cash",
            Self::Upi => "UPI",
        };
        f.pad(label)
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "bank_transfer" | "bank" | "neft" | "rtgs" => Ok(Self::BankTransfer),
            "cheque" | "check" => Ok(Self::Cheque),
            "cash" => Ok(Self::Cash),
            "upi" => Ok(Self::Upi),
            _ => Err(format!(
                "Unknown payment method '{}' (expected bank-transfer, cheque, cash or upi)",
                s
            )),
        }
    }
}

/// A payment to HPCL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HpclPayment {
    pub id: PaymentId,
    pub date: NaiveDate,
    pub amount: Money,
    #[serde(default)]
    pub method: PaymentMethod,
    /// UTR / cheque number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl HpclPayment {
    pub fn new(date: NaiveDate, amount: Money, method: PaymentMethod) -> Self {
        Self {
            id: PaymentId::new(),
            date,
            amount,
            method,
            reference: None,
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.amount.is_positive() {
            return Err("Payment amount must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse() {
        assert_eq!("Bank Transfer".parse::<PaymentMethod>().unwrap(), PaymentMethod::BankTransfer);
        assert_eq!("neft".parse::<PaymentMethod>().unwrap(), PaymentMethod::BankTransfer);
        assert_eq!("UPI".parse::<PaymentMethod>().unwrap(), PaymentMethod::Upi);
        assert!("barter".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_validate() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 4).unwrap();
        assert!(HpclPayment::new(date, Money::from_rupees(100), PaymentMethod::Cash)
            .validate()
            .is_ok());
        assert!(HpclPayment::new(date, Money::zero(), PaymentMethod::Cash)
            .validate()
            .is_err());
    }
}
