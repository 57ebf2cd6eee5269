//! HPCL payment repository for JSON storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::NaiveDate;

use crate::error::LedgerError;
use crate::models::{HpclPayment, PaymentId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct PaymentData {
    payments: Vec<HpclPayment>,
}

/// Repository for HPCL payment persistence
pub struct PaymentRepository {
    path: PathBuf,
    data: RwLock<HashMap<PaymentId, HpclPayment>>,
}

impl PaymentRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: PaymentData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for payment in file_data.payments {
            data.insert(payment.id, payment);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), LedgerError> {
        let payments = self.get_all()?;
        write_json_atomic(&self.path, &PaymentData { payments })
    }

    pub fn get(&self, id: PaymentId) -> Result<Option<HpclPayment>, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// Find payments by a full or shortened ID
    pub fn find_by_short_id(&self, short: &str) -> Result<Vec<HpclPayment>, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data
            .values()
            .filter(|p| p.id.matches_short(short))
            .cloned()
            .collect())
    }

    /// All payments, oldest first
    pub fn get_all(&self) -> Result<Vec<HpclPayment>, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut payments: Vec<_> = data.values().cloned().collect();
        payments.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
        Ok(payments)
    }

    pub fn get_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HpclPayment>, LedgerError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|p| p.date >= start && p.date <= end)
            .collect())
    }

    pub fn upsert(&self, payment: HpclPayment) -> Result<(), LedgerError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.insert(payment.id, payment);
        Ok(())
    }

    pub fn delete(&self, id: PaymentId) -> Result<bool, LedgerError> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, PaymentMethod};
    use tempfile::TempDir;

    #[test]
    fn test_round_trip_and_range() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("hpcl_payments.json");
        let repo = PaymentRepository::new(path.clone());

        for d in [1, 5, 9] {
            let date = NaiveDate::from_ymd_opt(2025, 8, d).unwrap();
            repo.upsert(HpclPayment::new(date, Money::from_rupees(1000), PaymentMethod::Cheque))
                .unwrap();
        }
        repo.save().unwrap();

        let reloaded = PaymentRepository::new(path);
        reloaded.load().unwrap();
        assert_eq!(reloaded.count().unwrap(), 3);

        let start = NaiveDate::from_ymd_opt(2025, 8, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 8, 9).unwrap();
        assert_eq!(reloaded.get_by_date_range(start, end).unwrap().len(), 2);
    }
}
