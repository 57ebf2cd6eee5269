//! Procurement CLI commands
//!
//! Invoice entry plus bulk CSV import with a preview step.

use std::path::PathBuf;

use clap::Subcommand;

use crate::display::format_procurement_list;
use crate::error::{LedgerError, LedgerResult};
use crate::services::import::ImportStatus;
use crate::services::{
    write_template, CreateProcurementInput, ImportService, ProcurementService,
    UpdateProcurementInput,
};
use crate::storage::Storage;

use super::args::{optional_range, parse_date, parse_fuel, write_to_file};

/// Procurement subcommands
#[derive(Subcommand, Debug)]
pub enum ProcurementCommands {
    /// Record an invoice line
    Add {
        /// Invoice number
        invoice: String,
        /// MS, HSD or POWER
        fuel: String,
        /// Litres received
        quantity: f64,
        /// Rate per litre
        rate: f64,
        /// Invoice date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Tanker registration
        #[arg(short, long)]
        vehicle: Option<String>,
        /// Supplier, defaults to HPCL
        #[arg(long)]
        supplier: Option<String>,
    },
    /// List invoice lines
    List {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
        /// Only one product
        #[arg(short, long)]
        fuel: Option<String>,
    },
    /// Correct an invoice line; the amount is recomputed
    Edit {
        /// Entry ID
        id: String,
        /// Invoice number
        #[arg(long)]
        invoice: Option<String>,
        /// Invoice date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
        /// MS, HSD or POWER
        #[arg(short, long)]
        fuel: Option<String>,
        /// Litres received
        #[arg(short, long)]
        quantity: Option<f64>,
        /// Rate per litre
        #[arg(short, long)]
        rate: Option<f64>,
        /// Tanker registration
        #[arg(short, long)]
        vehicle: Option<String>,
        /// Supplier
        #[arg(long)]
        supplier: Option<String>,
    },
    /// Delete an invoice line
    Delete {
        /// Entry ID
        id: String,
    },
    /// Import invoice lines from CSV
    Import {
        /// Path to CSV file
        file: PathBuf,
        /// Show what would be imported without saving
        #[arg(long)]
        dry_run: bool,
    },
    /// Write a CSV template for import
    Template {
        /// Output file, prints to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle a procurement command
pub fn handle_procurement_command(storage: &Storage, cmd: ProcurementCommands) -> LedgerResult<()> {
    let service = ProcurementService::new(storage);

    match cmd {
        ProcurementCommands::Add {
            invoice,
            fuel,
            quantity,
            rate,
            date,
            vehicle,
            supplier,
        } => {
            let invoice_date = match date {
                Some(d) => parse_date("invoice date", &d)?,
                None => chrono::Local::now().date_naive(),
            };
            let record = service.create(CreateProcurementInput {
                invoice_number: invoice,
                invoice_date,
                fuel_type: parse_fuel(&fuel)?,
                quantity,
                rate,
                vehicle_number: vehicle,
                supplier,
            })?;
            println!(
                "Recorded invoice {} ({}): {} L {} = {}",
                record.invoice_number,
                record.id,
                record.line.quantity,
                record.fuel_type,
                record.total_amount()
            );
        }

        ProcurementCommands::List { from, to, fuel } => {
            let range = optional_range(from.as_deref(), to.as_deref())?;
            let fuel = fuel.as_deref().map(parse_fuel).transpose()?;
            let records = service.list(range, fuel)?;
            print!("{}", format_procurement_list(&records));
        }

        ProcurementCommands::Edit {
            id,
            invoice,
            date,
            fuel,
            quantity,
            rate,
            vehicle,
            supplier,
        } => {
            let existing = service
                .find(&id)?
                .ok_or_else(|| LedgerError::procurement_not_found(&id))?;
            let record = service.update(
                existing.id,
                UpdateProcurementInput {
                    invoice_number: invoice,
                    invoice_date: date
                        .as_deref()
                        .map(|d| parse_date("invoice date", d))
                        .transpose()?,
                    fuel_type: fuel.as_deref().map(parse_fuel).transpose()?,
                    quantity,
                    rate,
                    vehicle_number: vehicle,
                    supplier,
                },
            )?;
            println!(
                "Updated invoice {} ({}): {} L {} = {}",
                record.invoice_number,
                record.id,
                record.line.quantity,
                record.fuel_type,
                record.total_amount()
            );
        }

        ProcurementCommands::Delete { id } => {
            let existing = service
                .find(&id)?
                .ok_or_else(|| LedgerError::procurement_not_found(&id))?;
            let record = service.delete(existing.id)?;
            println!(
                "Deleted invoice {} {} ({})",
                record.invoice_number, record.fuel_type, record.id
            );
        }

        ProcurementCommands::Import { file, dry_run } => {
            let import = ImportService::new(storage);
            let mut reader = csv::ReaderBuilder::new()
                .trim(csv::Trim::All)
                .from_path(&file)
                .map_err(|e| {
                    LedgerError::Import(format!("Cannot read {}: {}", file.display(), e))
                })?;
            let parsed = import.parse_csv_from_reader(&mut reader)?;
            let preview = import.generate_preview(parsed)?;

            for entry in &preview {
                match (&entry.status, &entry.record) {
                    (ImportStatus::New, Some(record)) => {
                        println!("  row {:>4}  new        {}", entry.row_number, record)
                    }
                    (ImportStatus::Duplicate, Some(record)) => {
                        println!("  row {:>4}  duplicate  {}", entry.row_number, record)
                    }
                    (ImportStatus::Error(message), _) => {
                        println!("  row {:>4}  error      {}", entry.row_number, message)
                    }
                    _ => {}
                }
            }

            if dry_run {
                let new = preview
                    .iter()
                    .filter(|e| e.status == ImportStatus::New)
                    .count();
                println!("\nDry run: {} of {} rows would be imported", new, preview.len());
                return Ok(());
            }

            let result = import.import_from_preview(&preview)?;
            println!(
                "\nImported {} invoice lines ({} duplicates skipped, {} errors)",
                result.imported, result.duplicates_skipped, result.errors
            );
        }

        ProcurementCommands::Template { output } => match output {
            Some(path) => {
                write_to_file(&path, |writer| write_template(writer))?;
                println!("Template written to: {}", path.display());
            }
            None => write_template(std::io::stdout().lock())?,
        },
    }

    Ok(())
}
