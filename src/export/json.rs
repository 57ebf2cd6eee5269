//! JSON Export functionality
//!
//! Exports every stored record to JSON with schema versioning.

use std::collections::HashSet;
use std::hash::Hash;
use std::io::Write;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{CustomerCreditEntry, HpclPayment, ProcurementRecord, ShiftRecord};
use crate::storage::Storage;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Full database export structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    pub station_name: String,

    pub shifts: Vec<ShiftRecord>,
    pub procurement: Vec<ProcurementRecord>,
    pub credit: Vec<CustomerCreditEntry>,
    pub payments: Vec<HpclPayment>,

    pub metadata: ExportMetadata,
}

/// Counts and date span of the exported data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub shift_count: usize,
    pub procurement_count: usize,
    pub credit_count: usize,
    pub payment_count: usize,

    /// Earliest business date with a shift entry
    pub earliest_shift: Option<NaiveDate>,

    /// Latest business date with a shift entry
    pub latest_shift: Option<NaiveDate>,
}

fn first_duplicate<T: Eq + Hash + Copy>(ids: impl Iterator<Item = T>) -> Option<T> {
    let mut seen = HashSet::new();
    ids.into_iter().find(|id| !seen.insert(*id))
}

impl FullExport {
    /// Create a new full export from storage
    pub fn from_storage(storage: &Storage, station_name: &str) -> LedgerResult<Self> {
        let shifts = storage.shifts.get_all()?;
        let procurement = storage.procurement.get_all()?;
        let credit = storage.credit.get_all()?;
        let payments = storage.payments.get_all()?;

        let metadata = ExportMetadata {
            shift_count: shifts.len(),
            procurement_count: procurement.len(),
            credit_count: credit.len(),
            payment_count: payments.len(),
            earliest_shift: shifts.iter().map(|s| s.date).min(),
            latest_shift: shifts.iter().map(|s| s.date).max(),
        };

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            station_name: station_name.to_string(),
            shifts,
            procurement,
            credit,
            payments,
            metadata,
        })
    }

    /// Validate the export structure
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }

        if let Some(id) = first_duplicate(self.shifts.iter().map(|s| s.id)) {
            return Err(format!("Shift record {} appears more than once", id));
        }
        if let Some(id) = first_duplicate(self.procurement.iter().map(|p| p.id)) {
            return Err(format!("Procurement entry {} appears more than once", id));
        }
        if let Some(id) = first_duplicate(self.credit.iter().map(|c| c.id)) {
            return Err(format!("Credit entry {} appears more than once", id));
        }
        if let Some(id) = first_duplicate(self.payments.iter().map(|p| p.id)) {
            return Err(format!("Payment {} appears more than once", id));
        }

        for invoice in &self.procurement {
            invoice
                .validate()
                .map_err(|e| format!("Procurement entry {}: {}", invoice.id, e))?;
        }
        for entry in &self.credit {
            entry
                .validate()
                .map_err(|e| format!("Credit entry {}: {}", entry.id, e))?;
        }
        for payment in &self.payments {
            payment
                .validate()
                .map_err(|e| format!("Payment {}: {}", payment.id, e))?;
        }

        Ok(())
    }
}

/// Export the full database to JSON
pub fn export_full_json<W: Write>(
    storage: &Storage,
    station_name: &str,
    writer: &mut W,
    pretty: bool,
) -> LedgerResult<()> {
    let export = FullExport::from_storage(storage, station_name)?;

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| LedgerError::Export(e.to_string()))?;

    Ok(())
}

/// Read back a JSON export for verification
pub fn import_from_json(json_str: &str) -> LedgerResult<FullExport> {
    let export: FullExport =
        serde_json::from_str(json_str).map_err(|e| LedgerError::Import(e.to_string()))?;

    export.validate().map_err(LedgerError::Import)?;

    Ok(export)
}
