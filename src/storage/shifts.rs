//! Shift record repository for JSON storage
//!
//! Manages loading and saving shift entries to shifts.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::NaiveDate;

use crate::error::LedgerError;
use crate::models::{Shift, ShiftRecord, ShiftRecordId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable shift data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ShiftData {
    shifts: Vec<ShiftRecord>,
}

/// Repository for shift record persistence
pub struct ShiftRepository {
    path: PathBuf,
    data: RwLock<HashMap<ShiftRecordId, ShiftRecord>>,
}

fn oldest_first(a: &ShiftRecord, b: &ShiftRecord) -> std::cmp::Ordering {
    a.date
        .cmp(&b.date)
        .then_with(|| a.shift.cmp(&b.shift))
        .then_with(|| a.created_at.cmp(&b.created_at))
}

impl ShiftRepository {
    /// Create a new shift repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load shift records from disk
    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: ShiftData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for record in file_data.shifts {
            data.insert(record.id, record);
        }

        Ok(())
    }

    /// Save shift records to disk, oldest first
    pub fn save(&self) -> Result<(), LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut shifts: Vec<_> = data.values().cloned().collect();
        shifts.sort_by(oldest_first);

        write_json_atomic(&self.path, &ShiftData { shifts })
    }

    /// Get a shift record by ID
    pub fn get(&self, id: ShiftRecordId) -> Result<Option<ShiftRecord>, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// Find a record by a full or shortened ID
    pub fn find_by_short_id(&self, short: &str) -> Result<Vec<ShiftRecord>, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data
            .values()
            .filter(|r| r.id.matches_short(short))
            .cloned()
            .collect())
    }

    /// Get all shift records ordered by date, then shift, then creation time
    pub fn get_all(&self) -> Result<Vec<ShiftRecord>, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut shifts: Vec<_> = data.values().cloned().collect();
        shifts.sort_by(oldest_first);
        Ok(shifts)
    }

    /// Get records whose entry date falls in [start, end]
    pub fn get_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ShiftRecord>, LedgerError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|r| r.date >= start && r.date <= end)
            .collect())
    }

    /// Records sharing a date and shift label
    pub fn get_by_key(&self, date: NaiveDate, shift: &Shift) -> Result<Vec<ShiftRecord>, LedgerError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|r| r.date == date && &r.shift == shift)
            .collect())
    }

    /// Insert or update a shift record
    pub fn upsert(&self, record: ShiftRecord) -> Result<(), LedgerError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.insert(record.id, record);
        Ok(())
    }

    /// Delete a shift record
    pub fn delete(&self, id: ShiftRecordId) -> Result<bool, LedgerError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(&id).is_some())
    }

    /// Count shift records
    pub fn count(&self) -> Result<usize, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }
}
