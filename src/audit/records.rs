//! How each ledger record identifies itself in the audit log

use chrono::NaiveDate;

use crate::models::{
    CreditKind, CustomerCreditEntry, HpclPayment, ProcurementRecord, ShiftRecord,
};

use super::entry::{Audited, EntityType};

impl Audited for ShiftRecord {
    const ENTITY_TYPE: EntityType = EntityType::ShiftRecord;

    fn audit_id(&self) -> String {
        self.id.to_string()
    }

    fn business_date(&self) -> NaiveDate {
        self.date
    }

    fn audit_label(&self) -> String {
        format!(
            "{} {} shift by {}, sales {}",
            self.date.format("%Y-%m-%d"),
            self.shift,
            self.manager,
            self.total_sales()
        )
    }
}

impl Audited for ProcurementRecord {
    const ENTITY_TYPE: EntityType = EntityType::Procurement;

    fn audit_id(&self) -> String {
        self.id.to_string()
    }

    fn business_date(&self) -> NaiveDate {
        self.invoice_date
    }

    fn audit_label(&self) -> String {
        format!(
            "{} {} {} L @ {:.2} = {}",
            self.invoice_number,
            self.fuel_type,
            self.line.quantity,
            self.line.rate,
            self.total_amount()
        )
    }
}

impl Audited for CustomerCreditEntry {
    const ENTITY_TYPE: EntityType = EntityType::CustomerCredit;

    fn audit_id(&self) -> String {
        self.id.to_string()
    }

    fn business_date(&self) -> NaiveDate {
        self.date
    }

    fn audit_label(&self) -> String {
        match (self.kind, self.fuel_type) {
            (CreditKind::Sale, Some(fuel)) => format!(
                "{}: sale of {} L {}, {}",
                self.customer_name,
                self.line.quantity,
                fuel,
                self.total_amount()
            ),
            _ => format!(
                "{}: {} {}",
                self.customer_name,
                self.kind.to_string().to_lowercase(),
                self.total_amount()
            ),
        }
    }
}

impl Audited for HpclPayment {
    const ENTITY_TYPE: EntityType = EntityType::HpclPayment;

    fn audit_id(&self) -> String {
        self.id.to_string()
    }

    fn business_date(&self) -> NaiveDate {
        self.date
    }

    fn audit_label(&self) -> String {
        let mut label = format!(
            "{} by {} on {}",
            self.amount,
            self.method,
            self.date.format("%Y-%m-%d")
        );
        if let Some(reference) = self.reference.as_deref().filter(|r| !r.is_empty()) {
            label.push_str(", ref ");
            label.push_str(reference);
        }
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FuelType, Money};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, day).unwrap()
    }

    #[test]
    fn test_invoice_label() {
        let invoice = ProcurementRecord::new("INV-7", date(1), FuelType::Hsd, 12000.0, 88.5);
        assert_eq!(invoice.audit_label(), "INV-7 HSD 12000 L @ 88.50 = ₹1062000.00");
        assert_eq!(invoice.business_date(), date(1));
    }

    #[test]
    fn test_credit_labels() {
        let sale = CustomerCreditEntry::sale("Sharma Transport", date(2), FuelType::Hsd, 50.0, 90.0);
        assert_eq!(sale.audit_label(), "Sharma Transport: sale of 50 L HSD, ₹4500.00");

        let payment =
            CustomerCreditEntry::payment("Sharma Transport", date(3), Money::from_rupees(2000));
        assert_eq!(payment.audit_label(), "Sharma Transport: payment ₹2000.00");
    }
}
