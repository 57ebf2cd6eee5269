//! Core data models for PumpLedger
//!
//! This module contains the data structures that represent the outlet's
//! books: shift entries, procurement invoices, customer credit, HPCL
//! payments, and the business-day rules that tie shift entries to dates.

pub mod business_day;
pub mod customer_credit;
pub mod fuel;
pub mod hpcl_payment;
pub mod ids;
pub mod money;
pub mod procurement;
pub mod raw;
pub mod shift_record;
pub mod tank;

pub use business_day::{
    lookback_start, BusinessDayWindow, CompletionStatus, Shift, ShiftSchedule,
};
pub use customer_credit::{CreditKind, CustomerCreditEntry};
pub use fuel::{derive_amount, FuelLine, FuelType};
pub use hpcl_payment::{HpclPayment, PaymentMethod};
pub use ids::{CreditEntryId, PaymentId, ProcurementId, ShiftRecordId};
pub use money::Money;
pub use procurement::ProcurementRecord;
pub use raw::{RawProcurementRecord, RawShiftRecord};
pub use shift_record::{Collections, ShiftRecord};
pub use tank::{TankCapacities, TankId, TankLevels};
