//! Customer Credit Reports
//!
//! Overview of what every credit customer owes, and the full history of one
//! customer with a running balance.

use std::io::Write;

use chrono::NaiveDate;

use crate::display::report::{csv_amount, csv_text, double_separator, separator, truncate};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{CreditKind, CustomerCreditEntry, Money};
use crate::services::CreditService;
use crate::storage::Storage;

/// One customer's position
#[derive(Debug, Clone)]
pub struct CustomerBalance {
    pub customer_name: String,
    pub total_sales: Money,
    pub total_payments: Money,
    /// Sales minus payments
    pub outstanding: Money,
    pub last_transaction: Option<NaiveDate>,
    pub transaction_count: usize,
}

impl CustomerBalance {
    fn from_entries(customer_name: String, entries: &[CustomerCreditEntry]) -> Self {
        let sum_kind = |kind| {
            entries
                .iter()
                .filter(|e| e.kind == kind)
                .map(|e| e.total_amount())
                .sum::<Money>()
        };
        let total_sales = sum_kind(CreditKind::Sale);
        let total_payments = sum_kind(CreditKind::Payment);

        Self {
            customer_name,
            total_sales,
            total_payments,
            outstanding: total_sales - total_payments,
            last_transaction: entries.iter().map(|e| e.date).max(),
            transaction_count: entries.len(),
        }
    }
}

/// Totals across all customers
#[derive(Debug, Clone, PartialEq)]
pub struct CreditSummary {
    pub total_outstanding: Money,
    pub total_customers: usize,
    pub customers_with_debt: usize,
    pub average_outstanding: Money,
}

/// Customer Credit Overview
#[derive(Debug, Clone)]
pub struct CreditOverviewReport {
    /// Highest outstanding first
    pub customers: Vec<CustomerBalance>,
    pub summary: CreditSummary,
}

impl CreditOverviewReport {
    pub fn generate(storage: &Storage) -> LedgerResult<Self> {
        let service = CreditService::new(storage);
        let all = service.list()?;

        let mut customers = Vec::new();
        for name in service.customers()? {
            let lower = name.to_lowercase();
            let entries: Vec<_> = all
                .iter()
                .filter(|e| e.customer_name.trim().to_lowercase() == lower)
                .cloned()
                .collect();
            customers.push(CustomerBalance::from_entries(name, &entries));
        }

        customers.sort_by(|a, b| {
            b.outstanding
                .cmp(&a.outstanding)
                .then_with(|| a.customer_name.cmp(&b.customer_name))
        });

        let total_outstanding: Money = customers.iter().map(|c| c.outstanding).sum();
        let summary = CreditSummary {
            total_outstanding,
            total_customers: customers.len(),
            customers_with_debt: customers.iter().filter(|c| c.outstanding.is_positive()).count(),
            average_outstanding: total_outstanding.div_round(customers.len()),
        };

        Ok(Self { customers, summary })
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();
        let width = 88;

        output.push_str("Customer Credit Overview\n");
        output.push_str(&double_separator(width));
        output.push('\n');
        output.push_str(&format!(
            "Total outstanding: {}   Customers: {} ({} owing)   Average: {}\n\n",
            self.summary.total_outstanding,
            self.summary.total_customers,
            self.summary.customers_with_debt,
            self.summary.average_outstanding
        ));

        if self.customers.is_empty() {
            output.push_str("No credit customers yet.\n");
            return output;
        }

        output.push_str(&format!(
            "{:<26} {:>14} {:>14} {:>14} {:>11} {:>5}\n",
            "Customer", "Sales", "Payments", "Outstanding", "Last", "Txns"
        ));
        output.push_str(&separator(width));
        output.push('\n');

        for c in &self.customers {
            output.push_str(&format!(
                "{:<26} {:>14} {:>14} {:>14} {:>11} {:>5}\n",
                truncate(&c.customer_name, 26),
                c.total_sales,
                c.total_payments,
                c.outstanding,
                c.last_transaction
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                c.transaction_count
            ));
        }

        output
    }

    /// Export the report to CSV format
    pub fn export_csv<W: Write>(&self, writer: &mut W) -> LedgerResult<()> {
        writeln!(
            writer,
            "customer,total_sales,total_payments,outstanding,last_transaction,transaction_count"
        )
        .map_err(|e| LedgerError::Export(e.to_string()))?;

        for c in &self.customers {
            writeln!(
                writer,
                "{},{},{},{},{},{}",
                csv_text(&c.customer_name),
                csv_amount(c.total_sales),
                csv_amount(c.total_payments),
                csv_amount(c.outstanding),
                c.last_transaction
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                c.transaction_count
            )
            .map_err(|e| LedgerError::Export(e.to_string()))?;
        }

        Ok(())
    }
}

/// A history line with the balance after it
#[derive(Debug, Clone)]
pub struct HistoryLine {
    pub entry: CustomerCreditEntry,
    pub running_balance: Money,
}

/// One customer's credit history
#[derive(Debug, Clone)]
pub struct CustomerHistoryReport {
    pub balance: CustomerBalance,
    pub first_transaction: Option<NaiveDate>,
    /// Newest first; running balances accumulate oldest to newest
    pub lines: Vec<HistoryLine>,
}

impl CustomerHistoryReport {
    pub fn generate(storage: &Storage, customer_name: &str) -> LedgerResult<Self> {
        let entries = CreditService::new(storage).entries_for(customer_name)?;
        let display_name = entries
            .first()
            .map(|e| e.customer_name.clone())
            .unwrap_or_else(|| customer_name.trim().to_string());

        let balance = CustomerBalance::from_entries(display_name, &entries);
        let first_transaction = entries.iter().map(|e| e.date).min();

        let mut running = Money::zero();
        let mut lines: Vec<_> = entries
            .into_iter()
            .map(|entry| {
                running += entry.signed_amount();
                HistoryLine {
                    entry,
                    running_balance: running,
                }
            })
            .collect();
        lines.reverse();

        Ok(Self {
            balance,
            first_transaction,
            lines,
        })
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();
        let width = 84;
        let b = &self.balance;

        output.push_str(&format!("Credit History: {}\n", b.customer_name));
        output.push_str(&double_separator(width));
        output.push('\n');
        output.push_str(&format!(
            "Sales: {}   Payments: {}   Balance: {}   ({} entries)\n\n",
            b.total_sales, b.total_payments, b.outstanding, b.transaction_count
        ));

        output.push_str(&format!(
            "{:<12} {:<8} {:<6} {:>10} {:>14} {:>14}  {}\n",
            "Date", "Type", "Fuel", "Litres", "Amount", "Balance", "Notes"
        ));
        output.push_str(&separator(width));
        output.push('\n');

        for line in &self.lines {
            let e = &line.entry;
            let litres = if e.kind == CreditKind::Sale {
                format!("{:.2}", e.line.quantity)
            } else {
                String::new()
            };
            output.push_str(&format!(
                "{:<12} {:<8} {:<6} {:>10} {:>14} {:>14}  {}\n",
                e.date.format("%Y-%m-%d").to_string(),
                e.kind,
                e.fuel_type.map(|f| f.to_string()).unwrap_or_default(),
                litres,
                e.signed_amount(),
                line.running_balance,
                truncate(&e.notes, 20)
            ));
        }

        output
    }

    /// Export the report to CSV format
    pub fn export_csv<W: Write>(&self, writer: &mut W) -> LedgerResult<()> {
        writeln!(writer, "date,type,fuel_type,quantity,rate,amount,running_balance,notes")
            .map_err(|e| LedgerError::Export(e.to_string()))?;

        for line in &self.lines {
            let e = &line.entry;
            writeln!(
                writer,
                "{},{},{},{},{},{},{},{}",
                e.date.format("%Y-%m-%d"),
                e.kind,
                e.fuel_type.map(|f| f.code()).unwrap_or(""),
                e.line.quantity,
                e.line.rate,
                csv_amount(e.signed_amount()),
                csv_amount(line.running_balance),
                csv_text(&e.notes)
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
    use crate::models::FuelType;
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
        let service = CreditService::new(storage);
        service
            .add_sale("Sharma Transport", date(1), FuelType::Hsd, 100.0, 90.0, None)
            .unwrap();
        service
            .add_sale("Sharma Transport", date(2), FuelType::Hsd, 50.0, 90.0, None)
            .unwrap();
        service
            .add_payment("Sharma Transport", date(5), Money::from_rupees(10_000), None)
            .unwrap();
        service
            .add_sale("Ravi Travels", date(3), FuelType::Ms, 20.0, 100.0, None)
            .unwrap();
        service
            .add_payment("Ravi Travels", date(4), Money::from_rupees(2000), None)
            .unwrap();
    }

    #[test]
    fn test_overview() {
        let (_temp, storage) = create_test_storage();
        seed(&storage);

        let report = CreditOverviewReport::generate(&storage).unwrap();
        assert_eq!(report.customers.len(), 2);

        let first = &report.customers[0];
        assert_eq!(first.customer_name, "Sharma Transport");
        assert_eq!(first.total_sales, Money::from_rupees(13_500));
        assert_eq!(first.outstanding, Money::from_rupees(3_500));
        assert_eq!(first.last_transaction, Some(date(5)));
        assert_eq!(first.transaction_count, 3);

        assert_eq!(report.customers[1].outstanding, Money::zero());
        assert_eq!(report.summary.total_outstanding, Money::from_rupees(3_500));
        assert_eq!(report.summary.customers_with_debt, 1);
        assert_eq!(report.summary.average_outstanding, Money::from_rupees(1_750));
    }

    #[test]
    fn test_history_running_balance() {
        let (_temp, storage) = create_test_storage();
        seed(&storage);

        let report = CustomerHistoryReport::generate(&storage, "sharma transport").unwrap();
        assert_eq!(report.lines.len(), 3);
        assert_eq!(report.first_transaction, Some(date(1)));

        // Newest first
        assert_eq!(report.lines[0].entry.date, date(5));
        assert_eq!(report.lines[0].running_balance, Money::from_rupees(3_500));
        assert_eq!(report.lines[1].running_balance, Money::from_rupees(13_500));
        assert_eq!(report.lines[2].running_balance, Money::from_rupees(9_000));
    }

    #[test]
    fn test_history_unknown_customer() {
        let (_temp, storage) = create_test_storage();
        assert!(CustomerHistoryReport::generate(&storage, "Nobody")
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_csv_exports() {
        let (_temp, storage) = create_test_storage();
        seed(&storage);

        let mut out = Vec::new();
        CreditOverviewReport::generate(&storage)
            .unwrap()
            .export_csv(&mut out)
            .unwrap();
        let csv = String::from_utf8(out).unwrap();
        assert!(csv.contains("Sharma Transport,13500.00,10000.00,3500.00,2025-08-05,3"));

        let mut out = Vec::new();
        CustomerHistoryReport::generate(&storage, "Ravi Travels")
            .unwrap()
            .export_csv(&mut out)
            .unwrap();
        let csv = String::from_utf8(out).unwrap();
        assert!(csv.contains("2025-08-04,Payment,,0,0,-2000.00,0.00,"));
    }
}
