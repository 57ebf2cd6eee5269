//! HPCL payment CLI commands

use clap::Subcommand;

use crate::display::format_payment_list;
use crate::error::{LedgerError, LedgerResult};
use crate::models::PaymentMethod;
use crate::services::{PaymentService, UpdatePaymentInput};
use crate::storage::Storage;

use super::args::{optional_range, parse_date, parse_money};

/// Payment subcommands
#[derive(Subcommand, Debug)]
pub enum PaymentCommands {
    /// Record a payment made to HPCL
    Add {
        /// Amount paid
        amount: String,
        /// Payment date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// bank-transfer, cheque, cash or upi
        #[arg(short, long, default_value = "bank-transfer")]
        method: String,
        /// UTR, cheque number or other reference
        #[arg(short, long)]
        reference: Option<String>,
        /// Notes
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Correct a recorded payment
    Edit {
        /// Payment ID
        id: String,
        /// Amount paid
        #[arg(short, long)]
        amount: Option<String>,
        /// Payment date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
        /// bank-transfer, cheque, cash or upi
        #[arg(short, long)]
        method: Option<String>,
        /// UTR or cheque number; an empty value clears it
        #[arg(short, long)]
        reference: Option<String>,
        /// Notes
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Delete a payment
    Delete {
        /// Payment ID
        id: String,
    },
    /// List payments
    List {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
}

/// Handle a payment command
pub fn handle_payment_command(storage: &Storage, cmd: PaymentCommands) -> LedgerResult<()> {
    let service = PaymentService::new(storage);

    match cmd {
        PaymentCommands::Add {
            amount,
            date,
            method,
            reference,
            notes,
        } => {
            let date = match date {
                Some(d) => parse_date("payment date", &d)?,
                None => chrono::Local::now().date_naive(),
            };
            let method: PaymentMethod = method.parse().map_err(LedgerError::Validation)?;
            let payment = service.create(
                date,
                parse_money("amount", &amount)?,
                method,
                reference,
                notes,
            )?;
            println!(
                "Recorded {} payment of {} on {} ({})",
                payment.method,
                payment.amount,
                payment.date.format("%Y-%m-%d"),
                payment.id
            );
        }

        PaymentCommands::Edit {
            id,
            amount,
            date,
            method,
            reference,
            notes,
        } => {
            let existing = service
                .find(&id)?
                .ok_or_else(|| LedgerError::payment_not_found(&id))?;
            let payment = service.update(
                existing.id,
                UpdatePaymentInput {
                    date: date
                        .as_deref()
                        .map(|d| parse_date("payment date", d))
                        .transpose()?,
                    amount: amount
                        .as_deref()
                        .map(|a| parse_money("amount", a))
                        .transpose()?,
                    method: method
                        .as_deref()
                        .map(|m| m.parse::<PaymentMethod>().map_err(LedgerError::Validation))
                        .transpose()?,
                    reference,
                    notes,
                },
            )?;
            println!(
                "Updated payment {}: {} by {} on {}",
                payment.id,
                payment.amount,
                payment.method,
                payment.date.format("%Y-%m-%d")
            );
        }

        PaymentCommands::Delete { id } => {
            let existing = service
                .find(&id)?
                .ok_or_else(|| LedgerError::payment_not_found(&id))?;
            let payment = service.delete(existing.id)?;
            println!(
                "Deleted payment of {} on {} ({})",
                payment.amount,
                payment.date.format("%Y-%m-%d"),
                payment.id
            );
        }

        PaymentCommands::List { from, to } => {
            let range = optional_range(from.as_deref(), to.as_deref())?;
            let payments = service.list(range)?;
            print!("{}", format_payment_list(&payments));
        }
    }

    Ok(())
}
