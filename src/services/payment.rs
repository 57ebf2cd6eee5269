//! HPCL payment service

use chrono::NaiveDate;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{HpclPayment, Money, PaymentId, PaymentMethod};
use crate::storage::Storage;

/// Service for direct payments to HPCL
pub struct PaymentService<'a> {
    storage: &'a Storage,
}

/// Fields to change on a payment; None leaves a field alone
#[derive(Debug, Clone, Default)]
pub struct UpdatePaymentInput {
    pub date: Option<NaiveDate>,
    pub amount: Option<Money>,
    pub method: Option<PaymentMethod>,
    /// Some("") clears the reference
    pub reference: Option<String>,
    pub notes: Option<String>,
}

impl<'a> PaymentService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Record a payment made to the supplier
    pub fn create(
        &self,
        date: NaiveDate,
        amount: Money,
        method: PaymentMethod,
        reference: Option<String>,
        notes: Option<String>,
    ) -> LedgerResult<HpclPayment> {
        let mut payment = HpclPayment::new(date, amount, method);
        payment.reference = reference
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        payment.notes = notes.unwrap_or_default();

        payment.validate().map_err(LedgerError::Validation)?;

        self.storage.payments.upsert(payment.clone())?;
        self.storage.payments.save()?;

        self.storage.log_create(&payment)?;

        tracing::info!(date = %payment.date, amount = %payment.amount, "HPCL payment recorded");
        Ok(payment)
    }

    pub fn get(&self, id: PaymentId) -> LedgerResult<Option<HpclPayment>> {
        self.storage.payments.get(id)
    }

    /// Find a payment by full or short ID
    pub fn find(&self, identifier: &str) -> LedgerResult<Option<HpclPayment>> {
        if let Ok(id) = identifier.parse::<PaymentId>() {
            return self.storage.payments.get(id);
        }

        let mut matches = self.storage.payments.find_by_short_id(identifier)?;
        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            n => Err(LedgerError::Validation(format!(
                "ID '{}' is ambiguous ({} payments match)",
                identifier, n
            ))),
        }
    }

    /// Payments, oldest first, optionally within a date range
    pub fn list(&self, range: Option<(NaiveDate, NaiveDate)>) -> LedgerResult<Vec<HpclPayment>> {
        match range {
            Some((start, end)) if end < start => Err(LedgerError::InvalidDateRange { start, end }),
            Some((start, end)) => self.storage.payments.get_by_date_range(start, end),
            None => self.storage.payments.get_all(),
        }
    }

    /// Correct a recorded payment
    pub fn update(&self, id: PaymentId, input: UpdatePaymentInput) -> LedgerResult<HpclPayment> {
        let mut payment = self
            .storage
            .payments
            .get(id)?
            .ok_or_else(|| LedgerError::payment_not_found(id.to_string()))?;
        let before = payment.clone();

        if let Some(date) = input.date {
            payment.date = date;
        }
        if let Some(amount) = input.amount {
            payment.amount = amount;
        }
        if let Some(method) = input.method {
            payment.method = method;
        }
        if let Some(reference) = input.reference {
            payment.reference = Some(reference.trim().to_string()).filter(|r| !r.is_empty());
        }
        if let Some(notes) = input.notes {
            payment.notes = notes;
        }

        payment.validate().map_err(LedgerError::Validation)?;

        self.storage.payments.upsert(payment.clone())?;
        self.storage.payments.save()?;

        self.storage.log_update(&before, &payment)?;

        tracing::info!(date = %payment.date, amount = %payment.amount, "HPCL payment edited");
        Ok(payment)
    }

    pub fn delete(&self, id: PaymentId) -> LedgerResult<HpclPayment> {
        let payment = self
            .storage
            .payments
            .get(id)?
            .ok_or_else(|| LedgerError::payment_not_found(id.to_string()))?;

        self.storage.payments.delete(id)?;
        self.storage.payments.save()?;

        self.storage.log_delete(&payment)?;

        Ok(payment)
    }
}
