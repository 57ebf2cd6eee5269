//! Audit logging for PumpLedger
//!
//! Every create, update and delete of a shift entry, invoice, credit entry or
//! HPCL payment is appended to `audit.log` as one JSON object per line, with
//! the before/after values and a field-level diff for updates.
//!
//! Each entry also carries the record's business date and a one-line label
//! built from its figures, so `pumpledger audit --date 2025-08-01` can show
//! every change that touched one day's books.
//!
//! ```rust,ignore
//! use pumpledger::audit::{AuditEntry, AuditLogger};
//!
//! let logger = AuditLogger::new(paths.audit_log());
//! logger.log(&AuditEntry::create(&record))?;
//! ```

mod diff;
mod entry;
mod logger;
mod records;

pub use diff::generate_diff;
pub use entry::{AuditEntry, Audited, EntityType, Operation};
pub use logger::{AuditFilter, AuditLogger};
