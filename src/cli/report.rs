//! CLI commands for reports
//!
//! Each report prints to the terminal, or writes CSV with `--output`.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::Subcommand;

use crate::config::settings::Settings;
use crate::error::LedgerResult;
use crate::reports::{
    AnomalyReport, CreditOverviewReport, DailySummaryReport, DepletionReport, DepletionThresholds,
    HpclLedgerReport, SalesTrendReport, StockReport,
};
use crate::storage::Storage;

use super::args::{resolve_range, write_to_file};

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Day-by-day sales, collections, variance and HPCL balance
    Daily {
        /// Start date (YYYY-MM-DD), defaults to the lookback window
        #[arg(short, long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD), defaults to the current business day
        #[arg(short, long)]
        to: Option<String>,
        /// Export to CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// HPCL account: invoices, payments and reported balances
    #[command(alias = "ledger")]
    Hpcl {
        /// Start date (YYYY-MM-DD), defaults to the lookback window
        #[arg(short, long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD), defaults to the current business day
        #[arg(short, long)]
        to: Option<String>,
        /// Export to CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Amount owed by each credit customer
    Credit {
        /// Export to CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Latest tank dips against capacity
    Stock {
        /// Export to CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Days with unusual sales or collections far from sales
    Anomalies {
        /// Start date (YYYY-MM-DD), defaults to the lookback window
        #[arg(short, long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD), defaults to the current business day
        #[arg(short, long)]
        to: Option<String>,
        /// Export to CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Daily sales trend and volatility per product
    Trends {
        /// Start date (YYYY-MM-DD), defaults to the lookback window
        #[arg(short, long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD), defaults to the current business day
        #[arg(short, long)]
        to: Option<String>,
        /// Export to CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Days of stock left at recent consumption, and when to reorder
    Depletion {
        /// Business days of consumption to average
        #[arg(short, long, default_value = "14")]
        days: u32,
        /// Days from order to delivery
        #[arg(long, default_value = "3")]
        lead_time: u32,
        /// Export to CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn current_business_day(settings: &Settings) -> NaiveDate {
    settings
        .shift_schedule
        .current_business_day(Local::now().naive_local())
}

/// Handle report commands
pub fn handle_report_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ReportCommands,
) -> LedgerResult<()> {
    match cmd {
        ReportCommands::Daily { from, to, output } => {
            let (start, end) = resolve_range(
                from.as_deref(),
                to.as_deref(),
                current_business_day(settings),
                settings.lookback_days,
            )?;
            let report = DailySummaryReport::generate(storage, start, end)?;

            for date in report.days_with_duplicates() {
                tracing::warn!(%date, "more than one entry for the same shift; figures were summed");
            }

            match output {
                Some(path) => {
                    write_to_file(&path, |writer| report.export_csv(writer))?;
                    println!("Daily summary exported to: {}", path.display());
                }
                None => print!("{}", report.format_terminal()),
            }
        }

        ReportCommands::Hpcl { from, to, output } => {
            let (start, end) = resolve_range(
                from.as_deref(),
                to.as_deref(),
                current_business_day(settings),
                settings.lookback_days,
            )?;
            let report = HpclLedgerReport::generate(storage, start, end)?;
            match output {
                Some(path) => {
                    write_to_file(&path, |writer| report.export_csv(writer))?;
                    println!("HPCL ledger exported to: {}", path.display());
                }
                None => print!("{}", report.format_terminal()),
            }
        }

        ReportCommands::Credit { output } => {
            let report = CreditOverviewReport::generate(storage)?;
            match output {
                Some(path) => {
                    write_to_file(&path, |writer| report.export_csv(writer))?;
                    println!("Credit report exported to: {}", path.display());
                }
                None => print!("{}", report.format_terminal()),
            }
        }

        ReportCommands::Stock { output } => {
            let report = StockReport::generate(
                storage,
                &settings.tank_capacities,
                settings.low_stock_percent,
            )?;
            match output {
                Some(path) => {
                    write_to_file(&path, |writer| report.export_csv(writer))?;
                    println!("Stock report exported to: {}", path.display());
                }
                None => print!("{}", report.format_terminal()),
            }
        }

        ReportCommands::Anomalies { from, to, output } => {
            let (start, end) = resolve_range(
                from.as_deref(),
                to.as_deref(),
                current_business_day(settings),
                settings.lookback_days,
            )?;
            let report = AnomalyReport::generate(storage, start, end)?;
            for anomaly in report.high_severity() {
                tracing::warn!(date = %anomaly.date, "{}", anomaly.description);
            }
            match output {
                Some(path) => {
                    write_to_file(&path, |writer| report.export_csv(writer))?;
                    println!("Anomaly report exported to: {}", path.display());
                }
                None => print!("{}", report.format_terminal()),
            }
        }

        ReportCommands::Trends { from, to, output } => {
            let (start, end) = resolve_range(
                from.as_deref(),
                to.as_deref(),
                current_business_day(settings),
                settings.lookback_days,
            )?;
            let report = SalesTrendReport::generate(storage, start, end)?;
            match output {
                Some(path) => {
                    write_to_file(&path, |writer| report.export_csv(writer))?;
                    println!("Sales trends exported to: {}", path.display());
                }
                None => print!("{}", report.format_terminal()),
            }
        }

        ReportCommands::Depletion {
            days,
            lead_time,
            output,
        } => {
            let thresholds = DepletionThresholds {
                minimum_percent: settings.low_stock_percent,
                lead_time_days: lead_time,
                lookback_days: days,
                ..DepletionThresholds::default()
            };
            let report = DepletionReport::generate(
                storage,
                &settings.tank_capacities,
                current_business_day(settings),
                thresholds,
            )?;
            match output {
                Some(path) => {
                    write_to_file(&path, |writer| report.export_csv(writer))?;
                    println!("Depletion forecast exported to: {}", path.display());
                }
                None => print!("{}", report.format_terminal()),
            }
        }
    }

    Ok(())
}
