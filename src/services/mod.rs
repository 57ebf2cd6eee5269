//! Service layer for PumpLedger
//!
//! Services sit on top of the storage layer and handle validation, audit
//! logging and cross-entity work. Aggregation and reconciliation are pure
//! functions over snapshots; their services only load the snapshots.

pub mod aggregation;
pub mod credit;
pub mod import;
pub mod payment;
pub mod procurement;
pub mod reconciliation;
pub mod shift;

pub use aggregation::{aggregate, AggregatedDayTotals, AggregationService, ShiftTotals};
pub use credit::CreditService;
pub use import::{write_template, ImportResult, ImportService};
pub use payment::{PaymentService, UpdatePaymentInput};
pub use procurement::{CreateProcurementInput, ProcurementService, UpdateProcurementInput};
pub use reconciliation::{
    average_variance, completion_status, resolve_hpcl_outstanding, total_variance, variance,
    HpclOutstanding,
};
pub use shift::{CreateShiftInput, ShiftFilter, ShiftService, UpdateShiftInput};
