//! Storage layer for PumpLedger
//!
//! JSON files with atomic writes, one per record kind, plus the audit log.
//! Reconciliation never reads from here directly; services load snapshots
//! from the repositories and pass them to the pure computations.

pub mod credit;
pub mod file_io;
pub mod init;
pub mod payments;
pub mod procurement;
pub mod shifts;

pub use credit::CreditRepository;
pub use file_io::{read_json, write_json_atomic};
pub use init::initialize_storage;
pub use payments::PaymentRepository;
pub use procurement::ProcurementRepository;
pub use shifts::ShiftRepository;

use crate::audit::{AuditEntry, AuditLogger, Audited};
use crate::config::paths::LedgerPaths;
use crate::error::LedgerError;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: LedgerPaths,
    pub shifts: ShiftRepository,
    pub procurement: ProcurementRepository,
    pub credit: CreditRepository,
    pub payments: PaymentRepository,
    audit: AuditLogger,
}

impl Storage {
    /// Create a new Storage instance, creating directories as needed
    pub fn new(paths: LedgerPaths) -> Result<Self, LedgerError> {
        paths.ensure_directories()?;

        Ok(Self {
            shifts: ShiftRepository::new(paths.shifts_file()),
            procurement: ProcurementRepository::new(paths.procurement_file()),
            credit: CreditRepository::new(paths.credit_file()),
            payments: PaymentRepository::new(paths.payments_file()),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    pub fn paths(&self) -> &LedgerPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), LedgerError> {
        self.shifts.load()?;
        self.procurement.load()?;
        self.credit.load()?;
        self.payments.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), LedgerError> {
        self.shifts.save()?;
        self.procurement.save()?;
        self.credit.save()?;
        self.payments.save()?;
        Ok(())
    }

    /// Audit log for this data directory
    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Record a create in the audit log
    pub fn log_create<T: Audited>(&self, record: &T) -> Result<(), LedgerError> {
        self.audit.log(&AuditEntry::create(record))
    }

    /// Record an update, with a field diff, in the audit log
    pub fn log_update<T: Audited>(&self, before: &T, after: &T) -> Result<(), LedgerError> {
        self.audit.log(&AuditEntry::update(before, after))
    }

    /// Record a delete in the audit log
    pub fn log_delete<T: Audited>(&self, record: &T) -> Result<(), LedgerError> {
        self.audit.log(&AuditEntry::delete(record))
    }

    /// Check if `init` has been run for this data directory
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }
}
