//! Display formatting for terminal output
//!
//! List views are rendered with `tabled`; detail views and reports are
//! assembled line by line.

pub mod ledger;
pub mod report;
pub mod shift;

pub use ledger::{format_credit_list, format_payment_list, format_procurement_list};
pub use shift::{format_shift_details, format_shift_list};
