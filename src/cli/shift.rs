//! Shift entry CLI commands

use chrono::NaiveDateTime;
use clap::{Args, Subcommand};

use crate::config::settings::Settings;
use crate::display::{format_shift_details, format_shift_list};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Collections, FuelType, Shift, TankId, TankLevels};
use crate::services::{CreateShiftInput, ShiftFilter, ShiftService, UpdateShiftInput};
use crate::storage::Storage;

use super::args::{
    optional_range, parse_date, parse_money, parse_optional_date, parse_optional_money,
    parse_rate_quantity, timestamp_or_now,
};

/// Figures reported for a shift
#[derive(Args, Debug, Default)]
pub struct ShiftFigures {
    /// MS (petrol) sold as RATE:LITRES
    #[arg(long, value_name = "RATE:LITRES")]
    pub ms: Option<String>,
    /// HSD (diesel) sold as RATE:LITRES
    #[arg(long, value_name = "RATE:LITRES")]
    pub hsd: Option<String>,
    /// POWER (premium petrol) sold as RATE:LITRES
    #[arg(long, value_name = "RATE:LITRES")]
    pub power: Option<String>,

    /// Cash collected
    #[arg(long)]
    pub cash: Option<String>,
    /// Card collections
    #[arg(long)]
    pub card: Option<String>,
    /// Paytm collections
    #[arg(long)]
    pub paytm: Option<String>,
    /// HP fleet card / loyalty transactions
    #[arg(long)]
    pub hp: Option<String>,

    /// HSD tank 1 dip in litres
    #[arg(long)]
    pub hsd1: Option<f64>,
    /// HSD tank 2 dip in litres
    #[arg(long)]
    pub hsd2: Option<f64>,
    /// MS tank 1 dip in litres
    #[arg(long)]
    pub ms1: Option<f64>,
    /// MS tank 2 dip in litres
    #[arg(long)]
    pub ms2: Option<f64>,
    /// POWER tank dip in litres
    #[arg(long)]
    pub power1: Option<f64>,

    /// HPCL account balance as shown on the supplier statement
    #[arg(long)]
    pub outstanding: Option<String>,
    /// Amount paid to HPCL during the shift
    #[arg(long)]
    pub hpcl_payment: Option<String>,
    /// Manager's notes
    #[arg(short, long)]
    pub notes: Option<String>,
}

impl ShiftFigures {
    fn fuel_lines(&self) -> LedgerResult<Vec<(FuelType, f64, f64)>> {
        [
            (FuelType::Ms, &self.ms),
            (FuelType::Hsd, &self.hsd),
            (FuelType::Power, &self.power),
        ]
        .into_iter()
        .filter_map(|(fuel, value)| value.as_deref().map(|v| parse_rate_quantity(fuel, v)))
        .collect()
    }

    fn has_tanks(&self) -> bool {
        [self.hsd1, self.hsd2, self.ms1, self.ms2, self.power1]
            .iter()
            .any(Option::is_some)
    }

    /// Apply given dips on top of `base`
    fn tanks(&self, base: TankLevels) -> TankLevels {
        let mut levels = base;
        for (tank, value) in [
            (TankId::Hsd1, self.hsd1),
            (TankId::Hsd2, self.hsd2),
            (TankId::Ms1, self.ms1),
            (TankId::Ms2, self.ms2),
            (TankId::Power1, self.power1),
        ] {
            if let Some(level) = value {
                levels.set(tank, level);
            }
        }
        levels
    }

    fn has_collections(&self) -> bool {
        [&self.cash, &self.card, &self.paytm, &self.hp]
            .iter()
            .any(|v| v.is_some())
    }

    /// Apply given collection figures on top of `base`
    fn collections(&self, base: Collections) -> LedgerResult<Collections> {
        let mut collections = base;
        if let Some(v) = &self.cash {
            collections.cash = parse_money("cash", v)?;
        }
        if let Some(v) = &self.card {
            collections.card = parse_money("card", v)?;
        }
        if let Some(v) = &self.paytm {
            collections.paytm = parse_money("paytm", v)?;
        }
        if let Some(v) = &self.hp {
            collections.hp_transactions = parse_money("hp", v)?;
        }
        Ok(collections)
    }
}

/// Shift subcommands
#[derive(Subcommand, Debug)]
pub enum ShiftCommands {
    /// Record a shift entry
    Add {
        /// Shift manager
        #[arg(short, long)]
        manager: String,
        /// Business date (YYYY-MM-DD); derived from --at when omitted
        #[arg(short, long)]
        date: Option<String>,
        /// Day or Night; derived from --at when omitted
        #[arg(short, long)]
        shift: Option<String>,
        /// Time the entry refers to (YYYY-MM-DDTHH:MM), defaults to now
        #[arg(long)]
        at: Option<String>,
        #[command(flatten)]
        figures: ShiftFigures,
    },
    /// List shift entries
    List {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
        /// Only Day or Night entries
        #[arg(short, long)]
        shift: Option<String>,
        /// Filter by manager (partial match)
        #[arg(short, long)]
        manager: Option<String>,
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Show entry details
    Show {
        /// Entry ID
        id: String,
    },
    /// Correct an existing entry
    Edit {
        /// Entry ID
        id: String,
        /// New business date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
        /// New shift label
        #[arg(short, long)]
        shift: Option<String>,
        /// New manager
        #[arg(short, long)]
        manager: Option<String>,
        #[command(flatten)]
        figures: ShiftFigures,
    },
    /// Delete an entry
    Delete {
        /// Entry ID
        id: String,
    },
}

/// Business date and shift for a new entry
///
/// Explicit values win; anything missing comes from the shift schedule
/// applied to `at`.
fn resolve_slot(
    settings: &Settings,
    date: Option<&str>,
    shift: Option<&str>,
    at: NaiveDateTime,
) -> LedgerResult<(chrono::NaiveDate, Shift)> {
    let schedule = &settings.shift_schedule;
    let date = match parse_optional_date("date", date)? {
        Some(date) => date,
        None => schedule.resolve_business_day(at),
    };
    let shift = match shift {
        Some(label) => Shift::from_label(label),
        None => schedule.shift_for(at),
    };
    Ok((date, shift))
}

/// Handle a shift command
pub fn handle_shift_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ShiftCommands,
) -> LedgerResult<()> {
    let service = ShiftService::new(storage, settings.tank_capacities);

    match cmd {
        ShiftCommands::Add {
            manager,
            date,
            shift,
            at,
            figures,
        } => {
            let at = timestamp_or_now(at.as_deref())?;
            let (date, shift) = resolve_slot(settings, date.as_deref(), shift.as_deref(), at)?;

            let mut input = CreateShiftInput::new(date, shift, manager);
            input.fuel = figures.fuel_lines()?;
            input.tanks = figures.tanks(TankLevels::default());
            input.collections = figures.collections(Collections::default())?;
            input.total_outstanding =
                parse_optional_money("outstanding", figures.outstanding.as_deref())?;
            input.hpcl_payment =
                parse_optional_money("HPCL payment", figures.hpcl_payment.as_deref())?
                    .unwrap_or_default();
            input.notes = figures.notes;

            let record = service.create(input)?;
            println!(
                "Recorded {} shift for {} ({})",
                record.shift,
                record.date.format("%Y-%m-%d"),
                record.id
            );
            println!(
                "  Sales: {}  Collections: {}  Variance: {}",
                record.total_sales(),
                record.total_collections(),
                record.variance()
            );
            if !record.shift.is_recognized() {
                println!(
                    "  Note: '{}' is not a Day/Night label and will not count toward completion",
                    record.shift
                );
            }
        }

        ShiftCommands::List {
            from,
            to,
            shift,
            manager,
            limit,
        } => {
            let mut filter = ShiftFilter::new().limit(limit);
            if let Some((start, end)) = optional_range(from.as_deref(), to.as_deref())? {
                filter = filter.date_range(start, end);
            }
            if let Some(label) = shift {
                filter = filter.shift(Shift::from_label(&label));
            }
            if let Some(manager) = manager {
                filter = filter.manager(manager);
            }

            let records = service.list(filter)?;
            print!("{}", format_shift_list(&records));
        }

        ShiftCommands::Show { id } => {
            let record = service
                .find(&id)?
                .ok_or_else(|| LedgerError::shift_not_found(&id))?;
            print!("{}", format_shift_details(&record));
        }

        ShiftCommands::Edit {
            id,
            date,
            shift,
            manager,
            figures,
        } => {
            let existing = service
                .find(&id)?
                .ok_or_else(|| LedgerError::shift_not_found(&id))?;

            let input = UpdateShiftInput {
                date: date.as_deref().map(|d| parse_date("date", d)).transpose()?,
                shift: shift.as_deref().map(Shift::from_label),
                manager,
                fuel: figures.fuel_lines()?,
                tanks: figures
                    .has_tanks()
                    .then(|| figures.tanks(existing.tanks)),
                collections: if figures.has_collections() {
                    Some(figures.collections(existing.collections)?)
                } else {
                    None
                },
                total_outstanding: parse_optional_money(
                    "outstanding",
                    figures.outstanding.as_deref(),
                )?,
                hpcl_payment: parse_optional_money(
                    "HPCL payment",
                    figures.hpcl_payment.as_deref(),
                )?,
                notes: figures.notes,
            };

            let record = service.update(existing.id, input)?;
            println!("Updated shift entry {}", record.id);
            print!("{}", format_shift_details(&record));
        }

        ShiftCommands::Delete { id } => {
            let existing = service
                .find(&id)?
                .ok_or_else(|| LedgerError::shift_not_found(&id))?;
            let record = service.delete(existing.id)?;
            println!(
                "Deleted {} shift entry for {} ({})",
                record.shift,
                record.date.format("%Y-%m-%d"),
                record.id
            );
        }
    }

    Ok(())
}
