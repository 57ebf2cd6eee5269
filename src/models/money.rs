//! Money type for representing currency amounts
//!
//! Internally stores amounts in paise (i64) to avoid floating-point drift when
//! shift totals are summed across many entries. Rates and quantities stay
//! floating point; only the derived amounts are rounded into `Money`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Default display symbol (Indian rupee)
pub const RUPEE_SYMBOL: &str = "₹";

/// Represents a monetary amount stored as paise (hundredths of a rupee)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Create a Money amount from paise
    ///
    /// # Examples
    /// ```
    /// use pumpledger::models::Money;
    /// let amount = Money::from_paise(1050); // ₹10.50
    /// assert_eq!(amount.rupees(), 10);
    /// ```
    pub const fn from_paise(paise: i64) -> Self {
        Self(paise)
    }

    /// Create a Money amount from whole rupees
    pub const fn from_rupees(rupees: i64) -> Self {
        Self(rupees * 100)
    }

    /// Create a Money amount from a floating rupee value, rounded to the paisa
    ///
    /// Non-finite input is treated as zero.
    pub fn from_rupees_f64(rupees: f64) -> Self {
        if !rupees.is_finite() {
            return Self::zero();
        }
        Self((rupees * 100.0).round() as i64)
    }

    /// Create a zero Money amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the amount in paise
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Get the whole rupees portion (truncated toward zero)
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Get the paise portion (0-99)
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Get the amount as floating rupees (for CSV output and averages)
    pub fn as_rupees_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Check if the amount is zero
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Check if the amount is positive
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Check if the amount is negative
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Get the absolute value
    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Divide evenly across `count` parts, rounding half away from zero
    ///
    /// Returns zero when `count` is zero.
    pub fn div_round(&self, count: usize) -> Self {
        if count == 0 {
            return Self::zero();
        }
        Self::from_rupees_f64(self.as_rupees_f64() / count as f64)
    }

    /// Parse a money amount from a string
    ///
    /// Accepts formats: "10.50", "-10.50", "₹10.50", "Rs 10.50", "Rs.10", "1,250.00"
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let s = s.trim();

        let (negative, s) = if let Some(stripped) = s.strip_prefix('-') {
            (true, stripped)
        } else {
            (false, s)
        };

        let s = s
            .strip_prefix(RUPEE_SYMBOL)
            .or_else(|| s.strip_prefix("Rs."))
            .or_else(|| s.strip_prefix("Rs"))
            .unwrap_or(s)
            .trim();
        let cleaned: String = s.chars().filter(|c| *c != ',').collect();
        let invalid = || MoneyParseError::InvalidFormat(s.to_string());

        let (rupee_str, paise_str) = match cleaned.split_once('.') {
            Some((rupees, paise)) => (rupees, paise),
            None => (cleaned.as_str(), ""),
        };
        if rupee_str.is_empty() && paise_str.is_empty() {
            return Err(invalid());
        }
        if !rupee_str.bytes().all(|b| b.is_ascii_digit())
            || !paise_str.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        // Extra decimals are only accepted when they are zeros
        let (paise_digits, extra) = paise_str.split_at(paise_str.len().min(2));
        if extra.bytes().any(|b| b != b'0') {
            return Err(invalid());
        }

        let rupees: i64 = if rupee_str.is_empty() {
            0
        } else {
            rupee_str.parse().map_err(|_| invalid())?
        };
        let paise: i64 = match paise_digits.len() {
            0 => 0,
            1 => paise_digits.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => paise_digits.parse().map_err(|_| invalid())?,
        };

        let paise = rupees
            .checked_mul(100)
            .and_then(|p| p.checked_add(paise))
            .ok_or_else(invalid)?;

        Ok(Self(if negative { -paise } else { paise }))
    }

    /// Format with a currency symbol
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        if self.is_negative() {
            format!("-{}{}.{:02}", symbol, self.rupees().abs(), self.paise_part())
        } else {
            format!("{}{}.{:02}", symbol, self.rupees(), self.paise_part())
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = self.format_with_symbol(RUPEE_SYMBOL);
        // Honour width/alignment flags so reports can right-align amounts
        f.pad(&formatted)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> std::iter::Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid money format: {}", s),
        }
    }
}

impl std::error::Error for MoneyParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise() {
        let m = Money::from_paise(1050);
        assert_eq!(m.paise(), 1050);
        assert_eq!(m.rupees(), 10);
        assert_eq!(m.paise_part(), 50);
    }

    #[test]
    fn test_from_rupees_f64_rounds() {
        assert_eq!(Money::from_rupees_f64(0.125).paise(), 13);
        assert_eq!(Money::from_rupees_f64(106.5).paise(), 10650);
        assert_eq!(Money::from_rupees_f64(0.004).paise(), 0);
        assert_eq!(Money::from_rupees_f64(f64::NAN), Money::zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_paise(1050)), "₹10.50");
        assert_eq!(format!("{}", Money::from_paise(0)), "₹0.00");
        assert_eq!(format!("{}", Money::from_paise(-1050)), "-₹10.50");
        assert_eq!(format!("{:>8}", Money::from_paise(5)), "   ₹0.05");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_paise(1000);
        let b = Money::from_paise(500);

        assert_eq!((a + b).paise(), 1500);
        assert_eq!((a - b).paise(), 500);
        assert_eq!((-a).paise(), -1000);
    }

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("10.50").unwrap().paise(), 1050);
        assert_eq!(Money::parse("₹10.50").unwrap().paise(), 1050);
        assert_eq!(Money::parse("Rs 10.50").unwrap().paise(), 1050);
        assert_eq!(Money::parse("-10.50").unwrap().paise(), -1050);
        assert_eq!(Money::parse("1,250").unwrap().paise(), 125000);
        assert_eq!(Money::parse("10.5").unwrap().paise(), 1050);
        assert!(Money::parse("abc").is_err());
    }

    #[test]
    fn test_parse_rejects_malformed_amounts() {
        assert!(Money::parse("10.₹5").is_err());
        assert!(Money::parse("10.12abc").is_err());
        assert!(Money::parse("10.999").is_err());
        assert!(Money::parse("1.2.3").is_err());
        assert!(Money::parse("--5").is_err());
        assert!(Money::parse("").is_err());
        assert!(Money::parse(".").is_err());

        // Too large to hold in paise
        assert!(Money::parse("999999999999999999").is_err());
        assert!(Money::parse("92233720368547758.07").is_err());

        assert_eq!(Money::parse("10.500").unwrap().paise(), 1050);
        assert_eq!(Money::parse(".75").unwrap().paise(), 75);
        assert_eq!(Money::parse("Rs.10").unwrap().paise(), 1000);
    }

    #[test]
    fn test_div_round() {
        assert_eq!(Money::from_paise(1000).div_round(3).paise(), 333);
        assert_eq!(Money::from_paise(1000).div_round(0), Money::zero());
    }

    #[test]
    fn test_sum() {
        let amounts = vec![
            Money::from_paise(100),
            Money::from_paise(200),
            Money::from_paise(300),
        ];
        let total: Money = amounts.iter().sum();
        assert_eq!(total.paise(), 600);
    }

    #[test]
    fn test_serialization() {
        let m = Money::from_paise(1050);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "1050");

        let deserialized: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(m, deserialized);
    }
}
