//! Procurement repository for JSON storage
//!
//! Manages loading and saving invoices to procurement.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::NaiveDate;

use crate::error::LedgerError;
use crate::models::{FuelType, ProcurementId, ProcurementRecord};

use super::file_io::{read_json, write_json_atomic};

/// Serializable procurement data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ProcurementData {
    invoices: Vec<ProcurementRecord>,
}

/// Repository for procurement persistence
pub struct ProcurementRepository {
    path: PathBuf,
    data: RwLock<HashMap<ProcurementId, ProcurementRecord>>,
}

impl ProcurementRepository {
    /// Create a new procurement repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load invoices from disk
    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: ProcurementData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for invoice in file_data.invoices {
            data.insert(invoice.id, invoice);
        }

        Ok(())
    }

    /// Save invoices to disk
    pub fn save(&self) -> Result<(), LedgerError> {
        let invoices = self.get_all()?;
        write_json_atomic(&self.path, &ProcurementData { invoices })
    }

    /// Get an invoice by ID
    pub fn get(&self, id: ProcurementId) -> Result<Option<ProcurementRecord>, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// Find invoices by a full or shortened ID
    pub fn find_by_short_id(&self, short: &str) -> Result<Vec<ProcurementRecord>, LedgerError> {
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

    /// Get all invoices, newest first
    pub fn get_all(&self) -> Result<Vec<ProcurementRecord>, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut invoices: Vec<_> = data.values().cloned().collect();
        invoices.sort_by(|a, b| {
            b.invoice_date
                .cmp(&a.invoice_date)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(invoices)
    }

    /// Get invoices dated in [start, end], newest first
    pub fn get_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ProcurementRecord>, LedgerError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|r| r.invoice_date >= start && r.invoice_date <= end)
            .collect())
    }

    /// Find an existing invoice line with the same number and fuel type
    pub fn find_duplicate(
        &self,
        invoice_number: &str,
        fuel_type: FuelType,
    ) -> Result<Option<ProcurementRecord>, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let key = (invoice_number.trim().to_ascii_uppercase(), fuel_type);
        Ok(data.values().find(|r| r.duplicate_key() == key).cloned())
    }

    /// Insert or update an invoice
    pub fn upsert(&self, invoice: ProcurementRecord) -> Result<(), LedgerError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.insert(invoice.id, invoice);
        Ok(())
    }

    /// Delete an invoice
    pub fn delete(&self, id: ProcurementId) -> Result<bool, LedgerError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(&id).is_some())
    }

    /// Count invoices
    pub fn count(&self) -> Result<usize, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, ProcurementRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = ProcurementRepository::new(temp_dir.path().join("procurement.json"));
        (temp_dir, repo)
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, d).unwrap()
    }

    #[test]
    fn test_save_and_reload_newest_first() {
        let (temp_dir, repo) = create_test_repo();
        repo.upsert(ProcurementRecord::new("A", date(1), FuelType::Ms, 9000.0, 100.0))
            .unwrap();
        repo.upsert(ProcurementRecord::new("B", date(3), FuelType::Hsd, 12000.0, 90.0))
            .unwrap();
        repo.save().unwrap();

        let repo2 = ProcurementRepository::new(temp_dir.path().join("procurement.json"));
        repo2.load().unwrap();
        let all = repo2.get_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].invoice_number, "B");
    }

    #[test]
    fn test_find_duplicate() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(ProcurementRecord::new("INV-9", date(1), FuelType::Ms, 1.0, 1.0))
            .unwrap();

        assert!(repo.find_duplicate("inv-9", FuelType::Ms).unwrap().is_some());
        assert!(repo.find_duplicate("INV-9", FuelType::Hsd).unwrap().is_none());
    }

    #[test]
    fn test_date_range() {
        let (_temp_dir, repo) = create_test_repo();
        for d in 1..=4 {
            repo.upsert(ProcurementRecord::new(
                format!("INV-{}", d),
                date(d),
                FuelType::Power,
                1.0,
                1.0,
            ))
            .unwrap();
        }
        assert_eq!(repo.get_by_date_range(date(2), date(3)).unwrap().len(), 2);
    }
}
