//! Storage tanks, end-of-shift dip readings and tank capacities

use serde::{Deserialize, Serialize};
use std::fmt;

use super::fuel::FuelType;

/// The five underground tanks at the outlet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TankId {
    Hsd1,
    Hsd2,
    Ms1,
    Ms2,
    Power1,
}

impl TankId {
    /// All tanks in display order
    pub const ALL: [TankId; 5] = [
        TankId::Hsd1,
        TankId::Hsd2,
        TankId::Ms1,
        TankId::Ms2,
        TankId::Power1,
    ];

    /// The product stored in this tank
    pub fn fuel_type(&self) -> FuelType {
        match self {
            Self::Hsd1 | Self::Hsd2 => FuelType::Hsd,
            Self::Ms1 | Self::Ms2 => FuelType::Ms,
            Self::Power1 => FuelType::Power,
        }
    }

    /// Column name used by the records store (e.g. `hsd1_tank`)
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Hsd1 => "hsd1_tank",
            Self::Hsd2 => "hsd2_tank",
            Self::Ms1 => "ms1_tank",
            Self::Ms2 => "ms2_tank",
            Self::Power1 => "power1_tank",
        }
    }
}

impl fmt::Display for TankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Hsd1 => "HSD-1",
            Self::Hsd2 => "HSD-2",
            Self::Ms1 => "MS-1",
            Self::Ms2 => "MS-2",
            Self::Power1 => "POWER-1",
        };
        f.pad(label)
    }
}

/// End-of-shift volume in each tank, in litres
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TankLevels {
    #[serde(default)]
    pub hsd1: f64,
    #[serde(default)]
    pub hsd2: f64,
    #[serde(default)]
    pub ms1: f64,
    #[serde(default)]
    pub ms2: f64,
    #[serde(default)]
    pub power1: f64,
}

impl TankLevels {
    /// Volume in a single tank
    pub fn get(&self, tank: TankId) -> f64 {
        match tank {
            TankId::Hsd1 => self.hsd1,
            TankId::Hsd2 => self.hsd2,
            TankId::Ms1 => self.ms1,
            TankId::Ms2 => self.ms2,
            TankId::Power1 => self.power1,
        }
    }

    /// Set the volume in a single tank
    pub fn set(&mut self, tank: TankId, level: f64) {
        match tank {
            TankId::Hsd1 => self.hsd1 = level,
            TankId::Hsd2 => self.hsd2 = level,
            TankId::Ms1 => self.ms1 = level,
            TankId::Ms2 => self.ms2 = level,
            TankId::Power1 => self.power1 = level,
        }
    }

    /// Total volume of one product across its tanks
    pub fn total_for(&self, fuel: FuelType) -> f64 {
        TankId::ALL
            .iter()
            .filter(|t| t.fuel_type() == fuel)
            .map(|t| self.get(*t))
            .sum()
    }

    /// True when no tank has a reading
    pub fn is_empty(&self) -> bool {
        TankId::ALL.iter().all(|t| self.get(*t) == 0.0)
    }
}

/// Fixed capacity of each tank, in litres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TankCapacities {
    pub hsd1: f64,
    pub hsd2: f64,
    pub ms1: f64,
    pub ms2: f64,
    pub power1: f64,
}

impl Default for TankCapacities {
    fn default() -> Self {
        Self {
            hsd1: 16000.0,
            hsd2: 22000.0,
            ms1: 9000.0,
            ms2: 9000.0,
            power1: 9000.0,
        }
    }
}

impl TankCapacities {
    /// Capacity of a single tank
    pub fn get(&self, tank: TankId) -> f64 {
        match tank {
            TankId::Hsd1 => self.hsd1,
            TankId::Hsd2 => self.hsd2,
            TankId::Ms1 => self.ms1,
            TankId::Ms2 => self.ms2,
            TankId::Power1 => self.power1,
        }
    }

    /// Combined capacity for one product
    pub fn total_for(&self, fuel: FuelType) -> f64 {
        TankId::ALL
            .iter()
            .filter(|t| t.fuel_type() == fuel)
            .map(|t| self.get(*t))
            .sum()
    }

    /// Check every reading is between zero and the tank's capacity
    pub fn check(&self, levels: &TankLevels) -> Result<(), TankLevelError> {
        for tank in TankId::ALL {
            let level = levels.get(tank);
            if !level.is_finite() || level < 0.0 {
                return Err(TankLevelError::Negative { tank, level });
            }
            let capacity = self.get(tank);
            if level > capacity {
                return Err(TankLevelError::OverCapacity {
                    tank,
                    level,
                    capacity,
                });
            }
        }
        Ok(())
    }
}

/// Invalid tank reading
#[derive(Debug, Clone, PartialEq)]
pub enum TankLevelError {
    Negative {
        tank: TankId,
        level: f64,
    },
    OverCapacity {
        tank: TankId,
        level: f64,
        capacity: f64,
    },
}

impl fmt::Display for TankLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Negative { tank, level } => {
                write!(f, "Tank {} reading cannot be negative ({})", tank, level)
            }
            Self::OverCapacity {
                tank,
                level,
                capacity,
            } => write!(
                f,
                "Tank {} reading {} exceeds capacity {}",
                tank, level, capacity
            ),
        }
    }
}

impl std::error::Error for TankLevelError {}
