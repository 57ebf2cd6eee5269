//! Customer credit repository for JSON storage
//!
//! Manages loading and saving credit ledger entries to customer_credit.json

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerError;
use crate::models::{CreditEntryId, CustomerCreditEntry};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct CreditData {
    entries: Vec<CustomerCreditEntry>,
}

/// Repository for customer credit persistence
pub struct CreditRepository {
    path: PathBuf,
    data: RwLock<HashMap<CreditEntryId, CustomerCreditEntry>>,
}

impl CreditRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: CreditData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for entry in file_data.entries {
            data.insert(entry.id, entry);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), LedgerError> {
        let entries = self.get_all()?;
        write_json_atomic(&self.path, &CreditData { entries })
    }

    /// All entries, oldest first
    pub fn get_all(&self) -> Result<Vec<CustomerCreditEntry>, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut entries: Vec<_> = data.values().cloned().collect();
        entries.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
        Ok(entries)
    }

    /// Entries for one customer (case-insensitive), oldest first
    pub fn get_by_customer(&self, name: &str) -> Result<Vec<CustomerCreditEntry>, LedgerError> {
        let name_lower = name.trim().to_lowercase();
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|e| e.customer_name.trim().to_lowercase() == name_lower)
            .collect())
    }

    /// Distinct customer names as first entered
    pub fn customer_names(&self) -> Result<Vec<String>, LedgerError> {
        let mut seen = BTreeSet::new();
        let mut names = Vec::new();
        for entry in self.get_all()? {
            if seen.insert(entry.customer_name.trim().to_lowercase()) {
                names.push(entry.customer_name.trim().to_string());
            }
        }
        Ok(names)
    }

    pub fn upsert(&self, entry: CustomerCreditEntry) -> Result<(), LedgerError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.insert(entry.id, entry);
        Ok(())
    }

    pub fn delete(&self, id: CreditEntryId) -> Result<bool, LedgerError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(&id).is_some())
    }

    pub fn count(&self) -> Result<usize, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }
}
