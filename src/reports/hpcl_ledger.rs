//! HPCL Transaction Ledger
//!
//! Everything that moved the station's credit account with HPCL over a date
//! range: invoices raise it, payments lower it, and each shift entry shows the
//! balance the manager reported. Balances are shown exactly as reported; the
//! ledger never computes a running balance of its own.

use std::cmp::Ordering;
use std::io::Write;

use chrono::NaiveDate;

use crate::display::report::{csv_amount, csv_text, double_separator, separator, truncate};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Money, ShiftRecord};
use crate::services::{resolve_hpcl_outstanding, HpclOutstanding};
use crate::storage::Storage;

/// Kind of ledger line, in on-screen order within a date
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LedgerEntryKind {
    Procurement,
    Payment,
    ShiftCollections,
}

impl LedgerEntryKind {
    fn code(&self) -> &'static str {
        match self {
            Self::Procurement => "procurement",
            Self::Payment => "payment",
            Self::ShiftCollections => "shift_collections",
        }
    }
}

/// One line in the ledger
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub date: NaiveDate,
    pub kind: LedgerEntryKind,
    pub description: String,
    pub reference: String,
    /// Increases the amount owed
    pub debit: Money,
    /// Decreases the amount owed
    pub credit: Money,
    /// Collections for shift rows
    pub collections: Money,
    /// Balance reported by the manager on this line, if any
    pub reported_balance: Option<Money>,
}

/// Key metrics for the period
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerMetrics {
    pub period_days: i64,
    pub total_procured: Money,
    pub total_payments: Money,
    /// Procured minus paid
    pub net_change: Money,
    pub average_daily_procurement: Money,
    /// Latest balance reported on or before the end date
    pub latest_reported: HpclOutstanding,
    pub procurement_count: usize,
    pub payment_count: usize,
    pub shift_count: usize,
}

/// HPCL Transaction Ledger
#[derive(Debug, Clone)]
pub struct HpclLedgerReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Newest first
    pub entries: Vec<LedgerEntry>,
    pub metrics: LedgerMetrics,
}

impl HpclLedgerReport {
    /// Generate the ledger for `[start, end]`
    pub fn generate(storage: &Storage, start: NaiveDate, end: NaiveDate) -> LedgerResult<Self> {
        if end < start {
            return Err(LedgerError::InvalidDateRange { start, end });
        }

        let all_shifts = storage.shifts.get_all()?;
        let in_range: Vec<&ShiftRecord> = all_shifts
            .iter()
            .filter(|r| r.date >= start && r.date <= end)
            .collect();

        let mut entries = Vec::new();

        for invoice in storage.procurement.get_by_date_range(start, end)? {
            entries.push(LedgerEntry {
                date: invoice.invoice_date,
                kind: LedgerEntryKind::Procurement,
                description: format!(
                    "Procurement {} {:.0} L",
                    invoice.fuel_type, invoice.line.quantity
                ),
                reference: invoice.invoice_number.clone(),
                debit: invoice.total_amount(),
                credit: Money::zero(),
                collections: Money::zero(),
                reported_balance: None,
            });
        }

        for record in in_range.iter().filter(|r| r.hpcl_payment.is_positive()) {
            entries.push(LedgerEntry {
                date: record.date,
                kind: LedgerEntryKind::Payment,
                description: format!("Payment to HPCL ({} shift)", record.shift),
                reference: format!("{}", record.id),
                debit: Money::zero(),
                credit: record.hpcl_payment,
                collections: Money::zero(),
                reported_balance: None,
            });
        }

        for payment in storage.payments.get_by_date_range(start, end)? {
            entries.push(LedgerEntry {
                date: payment.date,
                kind: LedgerEntryKind::Payment,
                description: format!("Payment to HPCL ({})", payment.method),
                reference: payment
                    .reference
                    .clone()
                    .unwrap_or_else(|| payment.id.to_string()),
                debit: Money::zero(),
                credit: payment.amount,
                collections: Money::zero(),
                reported_balance: None,
            });
        }

        for record in &in_range {
            entries.push(LedgerEntry {
                date: record.date,
                kind: LedgerEntryKind::ShiftCollections,
                description: format!("{} shift collections ({})", record.shift, record.manager),
                reference: record.id.to_string(),
                debit: Money::zero(),
                credit: Money::zero(),
                collections: record.total_collections(),
                reported_balance: record.reported_outstanding(),
            });
        }

        entries.sort_by(|a, b| match b.date.cmp(&a.date) {
            Ordering::Equal => a.kind.cmp(&b.kind),
            other => other,
        });

        let period_days = (end - start).num_days() + 1;
        let total_procured: Money = entries.iter().map(|e| e.debit).sum();
        let total_payments: Money = entries.iter().map(|e| e.credit).sum();
        let count = |kind| entries.iter().filter(|e| e.kind == kind).count();

        let metrics = LedgerMetrics {
            period_days,
            total_procured,
            total_payments,
            net_change: total_procured - total_payments,
            average_daily_procurement: total_procured.div_round(period_days as usize),
            latest_reported: resolve_hpcl_outstanding(&all_shifts, end),
            procurement_count: count(LedgerEntryKind::Procurement),
            payment_count: count(LedgerEntryKind::Payment),
            shift_count: count(LedgerEntryKind::ShiftCollections),
        };

        Ok(Self {
            start,
            end,
            entries,
            metrics,
        })
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();
        let width = 100;
        let m = &self.metrics;

        output.push_str(&format!(
            "HPCL Transaction Ledger: {} to {} ({} days)\n",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d"),
            m.period_days
        ));
        output.push_str(&double_separator(width));
        output.push('\n');

        output.push_str(&format!("Total procured:          {:>15}\n", m.total_procured));
        output.push_str(&format!("Total payments:          {:>15}\n", m.total_payments));
        output.push_str(&format!("Net change:              {:>15}\n", m.net_change));
        output.push_str(&format!(
            "Average daily procurement:{:>14}\n",
            m.average_daily_procurement
        ));
        match (m.latest_reported.is_reported(), m.latest_reported.entry_date) {
            (true, Some(date)) => output.push_str(&format!(
                "Latest reported balance: {:>15}  (as of {})\n",
                m.latest_reported.amount,
                date.format("%Y-%m-%d")
            )),
            _ => output.push_str("Latest reported balance:   (none reported)\n"),
        }
        output.push('\n');

        if self.entries.is_empty() {
            output.push_str("No HPCL activity in this period.\n");
            return output;
        }

        output.push_str(&format!(
            "{:<12} {:<38} {:>14} {:>14} {:>16}\n",
            "Date", "Description", "Debit", "Credit", "Reported O/S"
        ));
        output.push_str(&separator(width));
        output.push('\n');

        for entry in &self.entries {
            let cell = |m: Money| if m.is_zero() { String::new() } else { m.to_string() };
            output.push_str(&format!(
                "{:<12} {:<38} {:>14} {:>14} {:>16}\n",
                entry.date.format("%Y-%m-%d").to_string(),
                truncate(&entry.description, 38),
                cell(entry.debit),
                cell(entry.credit),
                entry
                    .reported_balance
                    .map(|b| b.to_string())
                    .unwrap_or_default()
            ));
        }

        output.push_str(&separator(width));
        output.push('\n');
        output.push_str(&format!(
            "{} procurement, {} payments, {} shift entries\n",
            m.procurement_count, m.payment_count, m.shift_count
        ));

        output
    }

    /// Export the report to CSV format
    pub fn export_csv<W: Write>(&self, writer: &mut W) -> LedgerResult<()> {
        writeln!(
            writer,
            "date,type,description,reference,debit,credit,collections,reported_balance"
        )
        .map_err(|e| LedgerError::Export(e.to_string()))?;

        for entry in &self.entries {
            writeln!(
                writer,
                "{},{},{},{},{},{},{},{}",
                entry.date.format("%Y-%m-%d"),
                entry.kind.code(),
                csv_text(&entry.description),
                csv_text(&entry.reference),
                csv_amount(entry.debit),
                csv_amount(entry.credit),
                csv_amount(entry.collections),
                entry.reported_balance.map(csv_amount).unwrap_or_default()
            )
            .map_err(|e| LedgerError::Export(e.to_string()))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::{FuelType, HpclPayment, PaymentMethod, ProcurementRecord, Shift};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, day).unwrap()
    }

    fn seed(storage: &Storage) {
        storage
            .procurement
            .upsert(ProcurementRecord::new("INV-1", date(2), FuelType::Hsd, 10000.0, 90.0))
            .unwrap();

        let mut shift = ShiftRecord::new(date(3), Shift::Day, "Ravi");
        shift.collections.cash = Money::from_rupees(40_000);
        shift.hpcl_payment = Money::from_rupees(100_000);
        shift.set_total_outstanding(Money::from_rupees(800_000));
        storage.shifts.upsert(shift).unwrap();

        let mut payment = HpclPayment::new(date(4), Money::from_rupees(200_000), PaymentMethod::BankTransfer);
        payment.reference = Some("UTR99".into());
        storage.payments.upsert(payment).unwrap();
    }

    #[test]
    fn test_generate_ledger() {
        let (_temp, storage) = create_test_storage();
        seed(&storage);

        let report = HpclLedgerReport::generate(&storage, date(1), date(10)).unwrap();
        let m = &report.metrics;
        assert_eq!(m.period_days, 10);
        assert_eq!(m.total_procured, Money::from_rupees(900_000));
        assert_eq!(m.total_payments, Money::from_rupees(300_000));
        assert_eq!(m.net_change, Money::from_rupees(600_000));
        assert_eq!(m.average_daily_procurement, Money::from_rupees(90_000));
        assert_eq!(m.latest_reported.amount, Money::from_rupees(800_000));
        assert!(m.latest_reported.is_carried_forward);
        assert_eq!((m.procurement_count, m.payment_count, m.shift_count), (1, 2, 1));

        // Newest first
        assert_eq!(report.entries[0].date, date(4));
        assert_eq!(report.entries.last().unwrap().date, date(2));
    }

    #[test]
    fn test_reported_balance_is_verbatim() {
        let (_temp, storage) = create_test_storage();
        seed(&storage);

        let report = HpclLedgerReport::generate(&storage, date(1), date(10)).unwrap();
        let shift_row = report
            .entries
            .iter()
            .find(|e| e.kind == LedgerEntryKind::ShiftCollections)
            .unwrap();
        assert_eq!(shift_row.reported_balance, Some(Money::from_rupees(800_000)));
        assert_eq!(shift_row.collections, Money::from_rupees(40_000));
    }

    #[test]
    fn test_empty_period() {
        let (_temp, storage) = create_test_storage();
        let report = HpclLedgerReport::generate(&storage, date(1), date(1)).unwrap();
        assert!(report.entries.is_empty());
        assert!(report.format_terminal().contains("No HPCL activity"));
        assert!(report.format_terminal().contains("(none reported)"));
    }

    #[test]
    fn test_csv_export() {
        let (_temp, storage) = create_test_storage();
        seed(&storage);

        let report = HpclLedgerReport::generate(&storage, date(1), date(10)).unwrap();
        let mut out = Vec::new();
        report.export_csv(&mut out).unwrap();
        let csv = String::from_utf8(out).unwrap();

        assert!(csv.starts_with("date,type,description"));
        assert!(csv.contains("2025-08-04,payment,Payment to HPCL (Bank Transfer),UTR99,0.00,200000.00"));
        assert!(csv.contains(",800000.00\n"));
    }
}
