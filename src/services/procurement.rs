//! Procurement service
//!
//! Fuel delivery invoices. An invoice line is identified by its invoice
//! number and fuel type; entering the same pair twice is refused.

use chrono::NaiveDate;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{FuelLine, FuelType, ProcurementId, ProcurementRecord};
use crate::storage::Storage;

/// Service for procurement management
pub struct ProcurementService<'a> {
    storage: &'a Storage,
}

/// Input for recording an invoice line
#[derive(Debug, Clone)]
pub struct CreateProcurementInput {
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub fuel_type: FuelType,
    pub quantity: f64,
    pub rate: f64,
    pub vehicle_number: Option<String>,
    pub supplier: Option<String>,
}

impl CreateProcurementInput {
    fn into_record(self) -> ProcurementRecord {
        let mut record = ProcurementRecord::new(
            self.invoice_number.trim(),
            self.invoice_date,
            self.fuel_type,
            self.quantity,
            self.rate,
        );
        if let Some(vehicle) = self.vehicle_number {
            record.vehicle_number = vehicle.trim().to_string();
        }
        if let Some(supplier) = self.supplier.filter(|s| !s.trim().is_empty()) {
            record.supplier = supplier.trim().to_string();
        }
        record
    }
}

/// Fields to change on an invoice line; None leaves a field alone
///
/// The amount is always re-derived from quantity × rate.
#[derive(Debug, Clone, Default)]
pub struct UpdateProcurementInput {
    pub invoice_number: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    pub fuel_type: Option<FuelType>,
    pub quantity: Option<f64>,
    pub rate: Option<f64>,
    /// Some("") clears the tanker registration
    pub vehicle_number: Option<String>,
    pub supplier: Option<String>,
}

impl<'a> ProcurementService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Record an invoice line
    pub fn create(&self, input: CreateProcurementInput) -> LedgerResult<ProcurementRecord> {
        let record = input.into_record();

        record
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        if self
            .storage
            .procurement
            .find_duplicate(&record.invoice_number, record.fuel_type)?
            .is_some()
        {
            return Err(LedgerError::Duplicate {
                entity_type: "Procurement entry",
                identifier: format!("{} ({})", record.invoice_number, record.fuel_type),
            });
        }

        self.storage.procurement.upsert(record.clone())?;
        self.storage.procurement.save()?;

        self.storage.log_create(&record)?;

        tracing::info!(
            invoice = %record.invoice_number,
            fuel = %record.fuel_type,
            amount = %record.total_amount(),
            "procurement recorded"
        );
        Ok(record)
    }

    pub fn get(&self, id: ProcurementId) -> LedgerResult<Option<ProcurementRecord>> {
        self.storage.procurement.get(id)
    }

    /// Find an invoice line by full or short ID
    pub fn find(&self, identifier: &str) -> LedgerResult<Option<ProcurementRecord>> {
        if let Ok(id) = identifier.parse::<ProcurementId>() {
            return self.storage.procurement.get(id);
        }

        let mut matches = self.storage.procurement.find_by_short_id(identifier)?;
        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            n => Err(LedgerError::Validation(format!(
                "ID '{}' is ambiguous ({} entries match)",
                identifier, n
            ))),
        }
    }

    /// Invoice lines, newest first, optionally limited to a date range and fuel
    pub fn list(
        &self,
        range: Option<(NaiveDate, NaiveDate)>,
        fuel_type: Option<FuelType>,
    ) -> LedgerResult<Vec<ProcurementRecord>> {
        let mut records = match range {
            Some((start, end)) => {
                if end < start {
                    return Err(LedgerError::InvalidDateRange { start, end });
                }
                self.storage.procurement.get_by_date_range(start, end)?
            }
            None => self.storage.procurement.get_all()?,
        };
        if let Some(fuel) = fuel_type {
            records.retain(|r| r.fuel_type == fuel);
        }
        Ok(records)
    }

    /// Edit an invoice line
    ///
    /// Moving it onto an invoice number and product that is already entered
    /// is refused.
    pub fn update(
        &self,
        id: ProcurementId,
        input: UpdateProcurementInput,
    ) -> LedgerResult<ProcurementRecord> {
        let mut record = self
            .storage
            .procurement
            .get(id)?
            .ok_or_else(|| LedgerError::procurement_not_found(id.to_string()))?;
        let before = record.clone();

        if let Some(invoice_number) = input.invoice_number {
            record.invoice_number = invoice_number.trim().to_string();
        }
        if let Some(date) = input.invoice_date {
            record.invoice_date = date;
        }
        if let Some(fuel) = input.fuel_type {
            record.fuel_type = fuel;
        }
        if input.quantity.is_some() || input.rate.is_some() {
            record.line = FuelLine::new(
                input.rate.unwrap_or(record.line.rate),
                input.quantity.unwrap_or(record.line.quantity),
            );
        }
        if let Some(vehicle) = input.vehicle_number {
            record.vehicle_number = vehicle.trim().to_string();
        }
        if let Some(supplier) = input.supplier.filter(|s| !s.trim().is_empty()) {
            record.supplier = supplier.trim().to_string();
        }

        record
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        if record.duplicate_key() != before.duplicate_key()
            && self
                .storage
                .procurement
                .find_duplicate(&record.invoice_number, record.fuel_type)?
                .is_some_and(|other| other.id != id)
        {
            return Err(LedgerError::Duplicate {
                entity_type: "Procurement entry",
                identifier: format!("{} ({})", record.invoice_number, record.fuel_type),
            });
        }

        self.storage.procurement.upsert(record.clone())?;
        self.storage.procurement.save()?;

        self.storage.log_update(&before, &record)?;

        tracing::info!(
            invoice = %record.invoice_number,
            fuel = %record.fuel_type,
            amount = %record.total_amount(),
            "procurement edited"
        );
        Ok(record)
    }

    /// Remove an invoice line
    pub fn delete(&self, id: ProcurementId) -> LedgerResult<ProcurementRecord> {
        let record = self
            .storage
            .procurement
            .get(id)?
            .ok_or_else(|| LedgerError::procurement_not_found(id.to_string()))?;

        self.storage.procurement.delete(id)?;
        self.storage.procurement.save()?;

        self.storage.log_delete(&record)?;

        Ok(record)
    }

    pub fn count(&self) -> LedgerResult<usize> {
        self.storage.procurement.count()
    }
}
