use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pumpledger::cli::{
    handle_audit_command, handle_credit_command, handle_dashboard_command, handle_export_command,
    handle_payment_command, handle_procurement_command, handle_report_command,
    handle_shift_command,
};
use pumpledger::config::paths::{LedgerPaths, DATA_DIR_ENV};
use pumpledger::config::settings::Settings;
use pumpledger::models::TankId;
use pumpledger::storage::Storage;

#[derive(Parser)]
#[command(
    name = "pumpledger",
    version,
    about = "Shift books and HPCL reconciliation for a fuel outlet",
    long_about = "PumpLedger records each shift's fuel sales, collections and tank dips, \
                  groups them into business days that run from the morning cutover to \
                  the next, and reconciles sales against collections and the HPCL \
                  supplier account."
)]
struct Cli {
    /// Directory holding settings and ledger files
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up the data directory and default settings
    Init,

    /// Show current configuration and paths
    Config,

    /// Shift entries
    #[command(subcommand)]
    Shift(pumpledger::cli::ShiftCommands),

    /// Procurement invoices
    #[command(subcommand, alias = "proc")]
    Procurement(pumpledger::cli::ProcurementCommands),

    /// Customer credit
    #[command(subcommand)]
    Credit(pumpledger::cli::CreditCommands),

    /// Payments to HPCL
    #[command(subcommand)]
    Payment(pumpledger::cli::PaymentCommands),

    /// Reports
    #[command(subcommand)]
    Report(pumpledger::cli::ReportCommands),

    /// Snapshot of one business day
    Dashboard {
        /// Business date (YYYY-MM-DD), defaults to the one in progress
        #[arg(short, long)]
        date: Option<String>,
        /// Treat this time as now (YYYY-MM-DDTHH:MM)
        #[arg(long)]
        at: Option<String>,
    },

    /// Export data
    #[command(subcommand)]
    Export(pumpledger::cli::ExportCommands),

    /// Show recent changes from the audit log
    Audit(pumpledger::cli::AuditArgs),
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let paths = match cli.data_dir {
        Some(dir) => LedgerPaths::with_base_dir(dir),
        None => LedgerPaths::new()?,
    };

    if let Some(Commands::Init) = cli.command {
        println!("Initializing PumpLedger at: {}", paths.base_dir().display());
        let settings = pumpledger::storage::init::initialize_storage(&paths)?;
        println!("Initialization complete!");
        println!();
        println!("Business day starts at {}", settings.shift_schedule.day_start);
        println!("Night shift starts at  {}", settings.shift_schedule.night_start);
        println!();
        println!("Edit {} to change the station name,", paths.settings_file().display());
        println!("shift times or tank capacities.");
        return Ok(());
    }

    let settings = Settings::load_or_create(&paths)?;

    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Some(Commands::Init) => {}
        Some(Commands::Config) => {
            println!("PumpLedger Configuration");
            println!("========================");
            println!("Base directory:  {}", paths.base_dir().display());
            println!("Data directory:  {}", paths.data_dir().display());
            println!("Settings file:   {}", paths.settings_file().display());
            println!("Audit log:       {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Station:          {}", settings.station_name);
            println!("  Currency:         {}", settings.currency_symbol);
            println!("  Day shift from:   {}", settings.shift_schedule.day_start);
            println!("  Night shift from: {}", settings.shift_schedule.night_start);
            println!("  Lookback days:    {}", settings.lookback_days);
            println!("  Low stock below:  {}%", settings.low_stock_percent);
            println!("  Tank capacities:");
            for tank in TankId::ALL {
                println!(
                    "    {:<8} {:>8.0} L",
                    tank,
                    settings.tank_capacities.get(tank)
                );
            }
        }
        Some(Commands::Shift(cmd)) => handle_shift_command(&storage, &settings, cmd)?,
        Some(Commands::Procurement(cmd)) => handle_procurement_command(&storage, cmd)?,
        Some(Commands::Credit(cmd)) => handle_credit_command(&storage, cmd)?,
        Some(Commands::Payment(cmd)) => handle_payment_command(&storage, cmd)?,
        Some(Commands::Report(cmd)) => handle_report_command(&storage, &settings, cmd)?,
        Some(Commands::Dashboard { date, at }) => {
            handle_dashboard_command(&storage, &settings, date, at)?
        }
        Some(Commands::Export(cmd)) => handle_export_command(&storage, &settings, cmd)?,
        Some(Commands::Audit(args)) => handle_audit_command(&storage, args)?,
        None => {
            println!("PumpLedger - shift books for a fuel outlet");
            println!();
            println!("Run 'pumpledger --help' for usage information.");
            println!("Run 'pumpledger dashboard' for today's business day.");
        }
    }

    Ok(())
}
