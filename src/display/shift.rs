//! Shift entry display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{FuelType, ShiftRecord, TankId};

use super::report::{truncate, variance_cell};

#[derive(Tabled)]
struct ShiftRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Shift")]
    shift: String,
    #[tabled(rename = "Manager")]
    manager: String,
    #[tabled(rename = "Sales")]
    sales: String,
    #[tabled(rename = "Collections")]
    collections: String,
    #[tabled(rename = "Variance")]
    variance: String,
    #[tabled(rename = "HPCL O/S")]
    outstanding: String,
}

impl From<&ShiftRecord> for ShiftRow {
    fn from(record: &ShiftRecord) -> Self {
        Self {
            id: record.id.to_string(),
            date: record.date.format("%Y-%m-%d").to_string(),
            shift: record.shift.to_string(),
            manager: truncate(&record.manager, 16),
            sales: record.total_sales().to_string(),
            collections: record.total_collections().to_string(),
            variance: variance_cell(record.variance()),
            outstanding: record
                .reported_outstanding()
                .map(|m| m.to_string())
                .unwrap_or_default(),
        }
    }
}

/// Table of shift entries
pub fn format_shift_list(records: &[ShiftRecord]) -> String {
    if records.is_empty() {
        return "No shift entries found.\n".to_string();
    }

    let rows: Vec<ShiftRow> = records.iter().map(ShiftRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}

/// Full detail of one entry
pub fn format_shift_details(record: &ShiftRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Shift entry: {}\n", record.id));
    output.push_str(&format!("Date:        {}\n", record.date.format("%Y-%m-%d")));
    output.push_str(&format!("Shift:       {}\n", record.shift));
    if !record.shift.is_recognized() {
        output.push_str("             (unrecognized label; not counted toward completion)\n");
    }
    output.push_str(&format!("Manager:     {}\n", record.manager));

    output.push_str("\nSales\n");
    for fuel in FuelType::ALL {
        let line = record.fuel_line(fuel);
        if line.is_empty() {
            continue;
        }
        output.push_str(&format!(
            "  {:<6} {:>10.2} L @ {:>8.2}  {:>14}\n",
            fuel,
            line.quantity,
            line.rate,
            line.amount()
        ));
    }
    output.push_str(&format!("  {:<33} {:>14}\n", "Total", record.total_sales()));

    let c = &record.collections;
    output.push_str("\nCollections\n");
    output.push_str(&format!("  {:<33} {:>14}\n", "Cash", c.cash));
    output.push_str(&format!("  {:<33} {:>14}\n", "Card", c.card));
    output.push_str(&format!("  {:<33} {:>14}\n", "Paytm", c.paytm));
    output.push_str(&format!("  {:<33} {:>14}\n", "HP transactions", c.hp_transactions));
    output.push_str(&format!("  {:<33} {:>14}\n", "Total", record.total_collections()));
    output.push_str(&format!("\nVariance:    {}\n", variance_cell(record.variance())));

    if !record.tanks.is_empty() {
        output.push_str("\nTank dips (L)\n");
        for tank in TankId::ALL {
            output.push_str(&format!("  {:<8} {:>10.1}\n", tank, record.tanks.get(tank)));
        }
    }

    output.push_str("\nHPCL\n");
    match record.reported_outstanding() {
        Some(amount) => output.push_str(&format!("  Outstanding: {}\n", amount)),
        None => output.push_str("  Outstanding: (not reported)\n"),
    }
    if !record.hpcl_payment.is_zero() {
        output.push_str(&format!("  Paid:        {}\n", record.hpcl_payment));
    }

    if !record.notes.is_empty() {
        output.push_str(&format!("\nNotes: {}\n", record.notes));
    }

    output
}
