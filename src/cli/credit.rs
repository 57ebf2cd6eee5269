//! Customer credit CLI commands

use std::path::PathBuf;

use clap::Subcommand;

use crate::display::format_credit_list;
use crate::error::{LedgerError, LedgerResult};
use crate::reports::{CreditOverviewReport, CustomerHistoryReport};
use crate::services::CreditService;
use crate::storage::Storage;

use super::args::{parse_date, parse_fuel, parse_money, write_to_file};

/// Customer credit subcommands
#[derive(Subcommand, Debug)]
pub enum CreditCommands {
    /// Record a credit sale or a payment received
    Add {
        /// Customer name
        customer: String,
        /// Fuel sold (MS, HSD, POWER); omit when recording a payment
        #[arg(short, long, requires_all = ["quantity", "rate"], conflicts_with = "payment")]
        fuel: Option<String>,
        /// Litres sold
        #[arg(short, long)]
        quantity: Option<f64>,
        /// Rate per litre
        #[arg(short, long)]
        rate: Option<f64>,
        /// Amount received from the customer
        #[arg(short, long)]
        payment: Option<String>,
        /// Entry date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Notes
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List all credit entries, or balances with --balances
    List {
        /// Show one line per customer with the amount owed
        #[arg(short, long)]
        balances: bool,
        /// Export balances to CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show one customer's entries with running balance
    History {
        /// Customer name
        customer: String,
        /// Export to CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle a credit command
pub fn handle_credit_command(storage: &Storage, cmd: CreditCommands) -> LedgerResult<()> {
    let service = CreditService::new(storage);

    match cmd {
        CreditCommands::Add {
            customer,
            fuel,
            quantity,
            rate,
            payment,
            date,
            notes,
        } => {
            let date = match date {
                Some(d) => parse_date("date", &d)?,
                None => chrono::Local::now().date_naive(),
            };

            let entry = match (fuel, payment) {
                (Some(fuel), None) => service.add_sale(
                    &customer,
                    date,
                    parse_fuel(&fuel)?,
                    quantity.unwrap_or_default(),
                    rate.unwrap_or_default(),
                    notes,
                )?,
                (None, Some(amount)) => {
                    service.add_payment(&customer, date, parse_money("payment", &amount)?, notes)?
                }
                _ => {
                    return Err(LedgerError::Validation(
                        "Give either --fuel with --quantity and --rate, or --payment".to_string(),
                    ))
                }
            };
            println!(
                "Recorded {} for {} on {}: {}",
                entry.kind,
                entry.customer_name,
                entry.date.format("%Y-%m-%d"),
                entry.total_amount()
            );
        }

        CreditCommands::List { balances, output } => {
            if balances || output.is_some() {
                let report = CreditOverviewReport::generate(storage)?;
                match output {
                    Some(path) => {
                        write_to_file(&path, |writer| report.export_csv(writer))?;
                        println!("Credit balances exported to: {}", path.display());
                    }
                    None => print!("{}", report.format_terminal()),
                }
            } else {
                print!("{}", format_credit_list(&service.list()?));
            }
        }

        CreditCommands::History { customer, output } => {
            let report = CustomerHistoryReport::generate(storage, &customer)?;
            match output {
                Some(path) => {
                    write_to_file(&path, |writer| report.export_csv(writer))?;
                    println!("Credit history exported to: {}", path.display());
                }
                None => print!("{}", report.format_terminal()),
            }
        }
    }

    Ok(())
}
