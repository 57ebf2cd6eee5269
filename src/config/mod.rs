//! Configuration module for PumpLedger
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Station settings persistence (shift schedule, tank capacities)

pub mod paths;
pub mod settings;

pub use paths::LedgerPaths;
pub use settings::Settings;
