//! CLI commands for data export

use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};

use crate::config::settings::Settings;
use crate::error::LedgerResult;
use crate::export::{csv, json, yaml};
use crate::storage::Storage;

use super::args::{optional_range, write_to_file};

/// Full export format
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    Json,
    /// Human-readable
    Yaml,
}

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export every record to a file
    All {
        /// Output file path
        output: PathBuf,

        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Export shift entries to CSV
    Shifts {
        /// Output file path
        output: PathBuf,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Export procurement invoices to CSV (re-importable)
    Procurement {
        /// Output file path
        output: PathBuf,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
}

/// Handle export commands
pub fn handle_export_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ExportCommands,
) -> LedgerResult<()> {
    match cmd {
        ExportCommands::All {
            output,
            format,
            pretty,
        } => {
            write_to_file(&output, |writer| match format {
                ExportFormat::Json => {
                    json::export_full_json(storage, &settings.station_name, writer, pretty)
                }
                ExportFormat::Yaml => {
                    yaml::export_full_yaml(storage, &settings.station_name, writer)
                }
            })?;
            println!("Full database exported to: {}", output.display());
        }

        ExportCommands::Shifts { output, from, to } => {
            let range = optional_range(from.as_deref(), to.as_deref())?;
            let mut count = 0;
            write_to_file(&output, |writer| {
                count = csv::export_shifts_csv(storage, writer, range)?;
                Ok(())
            })?;
            println!("Exported {} shift entries to: {}", count, output.display());
        }

        ExportCommands::Procurement { output, from, to } => {
            let range = optional_range(from.as_deref(), to.as_deref())?;
            let mut count = 0;
            write_to_file(&output, |writer| {
                count = csv::export_procurement_csv(storage, writer, range)?;
                Ok(())
            })?;
            println!("Exported {} invoice lines to: {}", count, output.display());
        }
    }

    Ok(())
}
