//! PumpLedger - shift books for a retail fuel outlet
//!
//! This library records what each shift sold and collected at a petrol pump,
//! rolls shift entries up into business days that run from one morning
//! cutover to the next, and reconciles sales against collections and against
//! the HPCL supplier account.
//!
//! # Architecture
//!
//! - `config`: Path resolution and station settings
//! - `error`: Custom error types
//! - `models`: Shift entries, invoices, credit, payments and business-day rules
//! - `storage`: JSON file storage layer
//! - `services`: Business logic, aggregation and reconciliation
//! - `reports`: Daily summary, HPCL ledger, credit, stock and dashboard
//! - `export`: JSON, YAML and CSV export
//! - `audit`: Audit logging system
//! - `display`: Terminal formatting
//! - `cli`: Command handlers for the `pumpledger` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use pumpledger::config::{paths::LedgerPaths, settings::Settings};
//! use pumpledger::services::AggregationService;
//! use pumpledger::storage::Storage;
//!
//! let paths = LedgerPaths::new()?;
//! let mut storage = Storage::new(paths)?;
//! storage.load_all()?;
//! let days = AggregationService::new(&storage).aggregate_range(start, end)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{LedgerError, LedgerResult};
