//! Customer credit service
//!
//! Credit sales to fleet customers and the payments that settle them.

use chrono::NaiveDate;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{CustomerCreditEntry, FuelType, Money};
use crate::storage::Storage;

/// Service for the customer credit ledger
pub struct CreditService<'a> {
    storage: &'a Storage,
}

impl<'a> CreditService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Record fuel sold on credit
    pub fn add_sale(
        &self,
        customer_name: &str,
        date: NaiveDate,
        fuel_type: FuelType,
        quantity: f64,
        rate: f64,
        notes: Option<String>,
    ) -> LedgerResult<CustomerCreditEntry> {
        let customer_name = self.canonical_name(customer_name)?;
        let mut entry = CustomerCreditEntry::sale(customer_name, date, fuel_type, quantity, rate);
        entry.notes = notes.unwrap_or_default();
        self.save_new(entry)
    }

    /// Record a payment received from a customer
    pub fn add_payment(
        &self,
        customer_name: &str,
        date: NaiveDate,
        amount: Money,
        notes: Option<String>,
    ) -> LedgerResult<CustomerCreditEntry> {
        let mut entry =
            CustomerCreditEntry::payment(self.canonical_name(customer_name)?, date, amount);
        entry.notes = notes.unwrap_or_default();
        self.save_new(entry)
    }

    /// All entries, oldest first
    pub fn list(&self) -> LedgerResult<Vec<CustomerCreditEntry>> {
        self.storage.credit.get_all()
    }

    /// Entries for one customer, oldest first
    pub fn entries_for(&self, customer_name: &str) -> LedgerResult<Vec<CustomerCreditEntry>> {
        let entries = self.storage.credit.get_by_customer(customer_name)?;
        if entries.is_empty() {
            return Err(LedgerError::NotFound {
                entity_type: "Customer",
                identifier: customer_name.trim().to_string(),
            });
        }
        Ok(entries)
    }

    pub fn customers(&self) -> LedgerResult<Vec<String>> {
        self.storage.credit.customer_names()
    }

    /// Reuse the spelling of an existing customer so "sharma transport"
    /// and "Sharma Transport" land in one account
    fn canonical_name(&self, customer_name: &str) -> LedgerResult<String> {
        let trimmed = customer_name.trim();
        let lower = trimmed.to_lowercase();
        Ok(self
            .storage
            .credit
            .customer_names()?
            .into_iter()
            .find(|n| n.to_lowercase() == lower)
            .unwrap_or_else(|| trimmed.to_string()))
    }

    fn save_new(&self, entry: CustomerCreditEntry) -> LedgerResult<CustomerCreditEntry> {
        entry
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.storage.credit.upsert(entry.clone())?;
        self.storage.credit.save()?;

        self.storage.log_create(&entry)?;

        tracing::info!(
            customer = %entry.customer_name,
            kind = %entry.kind,
            amount = %entry.total_amount(),
            "credit entry recorded"
        );
        Ok(entry)
    }
}
