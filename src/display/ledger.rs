//! Procurement, HPCL payment and credit entry lists

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{CustomerCreditEntry, HpclPayment, ProcurementRecord};

use super::report::truncate;

#[derive(Tabled)]
struct ProcurementRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Invoice")]
    invoice: String,
    #[tabled(rename = "Fuel")]
    fuel: String,
    #[tabled(rename = "Litres")]
    quantity: String,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Vehicle")]
    vehicle: String,
}

/// Table of procurement invoice lines
pub fn format_procurement_list(records: &[ProcurementRecord]) -> String {
    if records.is_empty() {
        return "No procurement entries found.\n".to_string();
    }

    let rows: Vec<_> = records
        .iter()
        .map(|r| ProcurementRow {
            id: r.id.to_string(),
            date: r.invoice_date.format("%Y-%m-%d").to_string(),
            invoice: truncate(&r.invoice_number, 18),
            fuel: r.fuel_type.to_string(),
            quantity: format!("{:.2}", r.line.quantity),
            rate: format!("{:.2}", r.line.rate),
            amount: r.total_amount().to_string(),
            vehicle: r.vehicle_number.clone(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}

#[derive(Tabled)]
struct PaymentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Reference")]
    reference: String,
}

/// Table of direct payments to HPCL
pub fn format_payment_list(payments: &[HpclPayment]) -> String {
    if payments.is_empty() {
        return "No HPCL payments found.\n".to_string();
    }

    let rows: Vec<_> = payments
        .iter()
        .map(|p| PaymentRow {
            id: p.id.to_string(),
            date: p.date.format("%Y-%m-%d").to_string(),
            amount: p.amount.to_string(),
            method: p.method.to_string(),
            reference: p.reference.clone().unwrap_or_default(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}

#[derive(Tabled)]
struct CreditRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Customer")]
    customer: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Fuel")]
    fuel: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Notes")]
    notes: String,
}

/// Table of customer credit entries
pub fn format_credit_list(entries: &[CustomerCreditEntry]) -> String {
    if entries.is_empty() {
        return "No credit entries found.\n".to_string();
    }

    let rows: Vec<_> = entries
        .iter()
        .map(|e| CreditRow {
            date: e.date.format("%Y-%m-%d").to_string(),
            customer: truncate(&e.customer_name, 24),
            kind: e.kind.to_string(),
            fuel: e.fuel_type.map(|f| f.to_string()).unwrap_or_default(),
            amount: e.total_amount().to_string(),
            notes: truncate(&e.notes, 30),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}
