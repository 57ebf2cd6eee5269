//! Dashboard command

use crate::config::settings::Settings;
use crate::error::LedgerResult;
use crate::reports::Dashboard;
use crate::storage::Storage;

use super::args::{parse_optional_date, timestamp_or_now};

/// Print the dashboard for `date`, or for the business day in progress
///
/// `at` stands in for the wall clock when choosing the current business day.
pub fn handle_dashboard_command(
    storage: &Storage,
    settings: &Settings,
    date: Option<String>,
    at: Option<String>,
) -> LedgerResult<()> {
    let now = timestamp_or_now(at.as_deref())?;
    let schedule = &settings.shift_schedule;

    let date = match parse_optional_date("date", date.as_deref())? {
        Some(date) => date,
        None => schedule.current_business_day(now),
    };

    let dashboard = Dashboard::generate(storage, settings, date)?;
    print!("{}", dashboard.format_terminal());

    if dashboard.window.contains(now) {
        println!("\nShift in progress: {}", schedule.shift_for(now));
    }

    Ok(())
}
