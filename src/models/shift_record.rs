//! Shift record model
//!
//! One manager-submitted entry for a single shift on a single calendar date:
//! fuel sold, end-of-shift tank dips, collections by payment method and the
//! HPCL credit snapshot.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

use super::business_day::Shift;
use super::fuel::{FuelLine, FuelType};
use super::ids::ShiftRecordId;
use super::money::Money;
use super::tank::{TankCapacities, TankLevelError, TankLevels};

/// Payment collected during a shift, by method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Collections {
    #[serde(default)]
    pub cash: Money,
    #[serde(default)]
    pub card: Money,
    #[serde(default)]
    pub paytm: Money,
    /// HP fleet card / loyalty transactions
    #[serde(default)]
    pub hp_transactions: Money,
}

impl Collections {
    /// Sum across all payment methods
    pub fn total(&self) -> Money {
        self.cash + self.card + self.paytm + self.hp_transactions
    }
}

impl Add for Collections {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            cash: self.cash + other.cash,
            card: self.card + other.card,
            paytm: self.paytm + other.paytm,
            hp_transactions: self.hp_transactions + other.hp_transactions,
        }
    }
}

impl AddAssign for Collections {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

/// A shift entry as recorded by the station manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftRecord {
    /// Unique identifier
    pub id: ShiftRecordId,

    /// Calendar date the entry was recorded under
    pub date: NaiveDate,

    /// Day or Night (or an unrecognized label)
    pub shift: Shift,

    /// Manager on duty
    pub manager: String,

    /// Motor spirit sold
    #[serde(default)]
    pub ms: FuelLine,

    /// Diesel sold
    #[serde(default)]
    pub hsd: FuelLine,

    /// Premium petrol sold
    #[serde(default)]
    pub power: FuelLine,

    /// End-of-shift tank dips
    #[serde(default)]
    pub tanks: TankLevels,

    /// Money collected
    #[serde(default)]
    pub collections: Collections,

    /// HPCL credit balance reported with this entry; None when not reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_outstanding: Option<Money>,

    /// Amount paid to HPCL during this shift
    #[serde(default)]
    pub hpcl_payment: Money,

    /// Manager notes
    #[serde(default)]
    pub notes: String,

    /// When the entry was created
    pub created_at: DateTime<Utc>,

    /// When the entry was last modified
    pub updated_at: DateTime<Utc>,
}

impl ShiftRecord {
    /// Create an empty entry for a date and shift
    pub fn new(date: NaiveDate, shift: Shift, manager: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ShiftRecordId::new(),
            date,
            shift,
            manager: manager.into(),
            ms: FuelLine::default(),
            hsd: FuelLine::default(),
            power: FuelLine::default(),
            tanks: TankLevels::default(),
            collections: Collections::default(),
            total_outstanding: None,
            hpcl_payment: Money::zero(),
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Fuel line for one product
    pub fn fuel_line(&self, fuel: FuelType) -> &FuelLine {
        match fuel {
            FuelType::Ms => &self.ms,
            FuelType::Hsd => &self.hsd,
            FuelType::Power => &self.power,
        }
    }

    /// Replace the fuel line for one product
    pub fn set_fuel_line(&mut self, fuel: FuelType, line: FuelLine) {
        match fuel {
            FuelType::Ms => self.ms = line,
            FuelType::Hsd => self.hsd = line,
            FuelType::Power => self.power = line,
        }
    }

    /// Record the HPCL balance; zero means "not reported"
    pub fn set_total_outstanding(&mut self, amount: Money) {
        self.total_outstanding = if amount.is_zero() { None } else { Some(amount) };
    }

    /// The HPCL balance if this entry reported one
    pub fn reported_outstanding(&self) -> Option<Money> {
        self.total_outstanding.filter(|m| !m.is_zero())
    }

    /// MS + HSD + POWER amounts
    pub fn total_sales(&self) -> Money {
        self.ms.amount() + self.hsd.amount() + self.power.amount()
    }

    /// Cash + card + Paytm + HP transactions
    pub fn total_collections(&self) -> Money {
        self.collections.total()
    }

    /// Sales minus collections for this entry
    pub fn variance(&self) -> Money {
        self.total_sales() - self.total_collections()
    }

    /// Mark the entry as modified
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Validate the entry against the station's tank capacities
    pub fn validate(&self, capacities: &TankCapacities) -> Result<(), ShiftValidationError> {
        if self.manager.trim().is_empty() {
            return Err(ShiftValidationError::EmptyManager);
        }

        for fuel in FuelType::ALL {
            let line = self.fuel_line(fuel);
            if line.rate < 0.0 || !line.rate.is_finite() {
                return Err(ShiftValidationError::Negative(format!("{} rate", fuel)));
            }
            if line.quantity < 0.0 || !line.quantity.is_finite() {
                return Err(ShiftValidationError::Negative(format!("{} quantity", fuel)));
            }
        }

        let c = &self.collections;
        for (name, amount) in [
            ("cash", c.cash),
            ("card", c.card),
            ("paytm", c.paytm),
            ("hp transactions", c.hp_transactions),
            ("hpcl payment", self.hpcl_payment),
        ] {
            if amount.is_negative() {
                return Err(ShiftValidationError::Negative(name.to_string()));
            }
        }

        capacities
            .check(&self.tanks)
            .map_err(ShiftValidationError::Tank)?;

        Ok(())
    }
}

impl fmt::Display for ShiftRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} shift ({})", self.date, self.shift, self.manager)
    }
}

/// Validation errors for shift records
#[derive(Debug, Clone, PartialEq)]
pub enum ShiftValidationError {
    EmptyManager,
    Negative(String),
    Tank(TankLevelError),
}

impl fmt::Display for ShiftValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyManager => write!(f, "Manager name cannot be empty"),
            Self::Negative(field) => write!(f, "{} cannot be negative", field),
            Self::Tank(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ShiftValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tank::TankId;

    fn sample() -> ShiftRecord {
        let mut record = ShiftRecord::new(
            NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            Shift::Day,
            "Ravi",
        );
        record.ms = FuelLine::new(100.0, 10.0);
        record.hsd = FuelLine::new(90.0, 20.0);
        record.collections = Collections {
            cash: Money::from_rupees(2000),
            card: Money::from_rupees(500),
            paytm: Money::from_rupees(200),
            hp_transactions: Money::from_rupees(50),
        };
        record
    }

    #[test]
    fn test_totals_and_variance() {
        let record = sample();
        assert_eq!(record.total_sales(), Money::from_rupees(2800));
        assert_eq!(record.total_collections(), Money::from_rupees(2750));
        assert_eq!(record.variance(), Money::from_rupees(50));
    }

    #[test]
    fn test_zero_outstanding_means_not_reported() {
        let mut record = sample();
        record.set_total_outstanding(Money::zero());
        assert_eq!(record.reported_outstanding(), None);

        record.set_total_outstanding(Money::from_rupees(5000));
        assert_eq!(record.reported_outstanding(), Some(Money::from_rupees(5000)));
    }

    #[test]
    fn test_validate() {
        let caps = TankCapacities::default();
        let mut record = sample();
        assert!(record.validate(&caps).is_ok());

        record.tanks.set(TankId::Power1, 9500.0);
        assert!(matches!(
            record.validate(&caps),
            Err(ShiftValidationError::Tank(_))
        ));

        let mut record = sample();
        record.manager = "  ".into();
        assert_eq!(record.validate(&caps), Err(ShiftValidationError::EmptyManager));

        let mut record = sample();
        record.collections.card = Money::from_rupees(-1);
        assert!(matches!(
            record.validate(&caps),
            Err(ShiftValidationError::Negative(_))
        ));
    }

    #[test]
    fn test_serialization() {
        let record = sample();
        let json = serde_json::to_string(&record).unwrap();
        let deserialized: ShiftRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.id, record.id);
        assert_eq!(deserialized.total_sales(), record.total_sales());
        assert_eq!(deserialized.shift, Shift::Day);
    }
}
