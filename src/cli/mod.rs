//! CLI command handlers
//!
//! Bridges clap argument parsing with the service and report layers.

pub mod args;
pub mod audit;
pub mod credit;
pub mod dashboard;
pub mod export;
pub mod payment;
pub mod procurement;
pub mod report;
pub mod shift;

pub use audit::{handle_audit_command, AuditArgs};
pub use credit::{handle_credit_command, CreditCommands};
pub use dashboard::handle_dashboard_command;
pub use export::{handle_export_command, ExportCommands};
pub use payment::{handle_payment_command, PaymentCommands};
pub use procurement::{handle_procurement_command, ProcurementCommands};
pub use report::{handle_report_command, ReportCommands};
pub use shift::{handle_shift_command, ShiftCommands};
