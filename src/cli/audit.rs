//! Audit log command

use clap::Args;

use crate::audit::{AuditFilter, EntityType};
use crate::error::{LedgerError, LedgerResult};
use crate::storage::Storage;

use super::args::parse_optional_date;

/// Which audit entries to show
#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Number of entries to show
    #[arg(short, long, default_value = "20")]
    pub limit: usize,
    /// Only one kind of record: shift, invoice, credit or payment
    #[arg(short, long)]
    pub entity: Option<String>,
    /// History of one record (short ID or full UUID)
    #[arg(long)]
    pub id: Option<String>,
    /// Changes to records booked on this business date (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: Option<String>,
}

/// Print the most recent matching audit entries, newest last
pub fn handle_audit_command(storage: &Storage, args: AuditArgs) -> LedgerResult<()> {
    let filter = AuditFilter {
        entity_type: args
            .entity
            .as_deref()
            .map(|e| e.parse::<EntityType>().map_err(LedgerError::Validation))
            .transpose()?,
        entity_id: args.id,
        business_date: parse_optional_date("date", args.date.as_deref())?,
    };

    let entries = storage.audit().read_filtered(&filter, args.limit)?;
    if entries.is_empty() {
        println!("No matching audit entries.");
        return Ok(());
    }

    for entry in &entries {
        println!("{}", entry.format_human_readable());
    }
    Ok(())
}
