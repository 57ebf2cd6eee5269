//! Per-day aggregation of shift entries and procurement
//!
//! Entries are grouped by `(date, shift)`; several entries under one key are
//! summed field by field, never replaced. The range is a plain inclusive
//! calendar range over entry dates, and every date in it gets a row even when
//! nothing was entered.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    Collections, CompletionStatus, FuelLine, FuelType, Money, ProcurementRecord, Shift,
    ShiftRecord, TankLevels,
};
use crate::storage::Storage;

use super::reconciliation::{resolve_hpcl_outstanding, HpclOutstanding};

/// Summed figures for one `(date, shift)` key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShiftTotals {
    pub shift: Shift,
    pub ms: FuelLine,
    pub hsd: FuelLine,
    pub power: FuelLine,
    pub collections: Collections,
    pub hpcl_payment: Money,
    /// Number of entries summed into this key; more than one means duplicates
    pub entry_count: usize,
}

impl ShiftTotals {
    fn empty(shift: Shift) -> Self {
        Self {
            shift,
            ms: FuelLine::default(),
            hsd: FuelLine::default(),
            power: FuelLine::default(),
            collections: Collections::default(),
            hpcl_payment: Money::zero(),
            entry_count: 0,
        }
    }

    /// Add one entry's figures into these totals
    pub fn absorb(&mut self, record: &ShiftRecord) {
        self.ms = self.ms.merge(&record.ms);
        self.hsd = self.hsd.merge(&record.hsd);
        self.power = self.power.merge(&record.power);
        self.collections += record.collections;
        self.hpcl_payment += record.hpcl_payment;
        self.entry_count += 1;
    }

    pub fn fuel_line(&self, fuel: FuelType) -> &FuelLine {
        match fuel {
            FuelType::Ms => &self.ms,
            FuelType::Hsd => &self.hsd,
            FuelType::Power => &self.power,
        }
    }

    pub fn total_sales(&self) -> Money {
        self.ms.amount() + self.hsd.amount() + self.power.amount()
    }

    pub fn total_collections(&self) -> Money {
        self.collections.total()
    }

    pub fn variance(&self) -> Money {
        self.total_sales() - self.total_collections()
    }
}

/// Everything known about one calendar date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedDayTotals {
    pub date: NaiveDate,
    /// Per-shift sums, keyed by shift label
    pub shifts: BTreeMap<Shift, ShiftTotals>,
    pub total_sales: Money,
    /// Collections by payment method across all shifts
    pub collections: Collections,
    pub total_collections: Money,
    /// Sales minus collections
    pub variance: Money,
    /// Procurement invoiced on this date, by fuel type
    pub procurement: BTreeMap<FuelType, FuelLine>,
    pub total_procurement: Money,
    /// Paid to HPCL from the shift entries of this date
    pub hpcl_payments: Money,
    /// Tank dips from the last entry of the date
    pub closing_tanks: Option<TankLevels>,
    pub hpcl_outstanding: HpclOutstanding,
    pub completion: CompletionStatus,
    /// Shift labels that were neither Day nor Night
    pub unrecognized_shifts: Vec<String>,
}

impl AggregatedDayTotals {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            shifts: BTreeMap::new(),
            total_sales: Money::zero(),
            collections: Collections::default(),
            total_collections: Money::zero(),
            variance: Money::zero(),
            procurement: BTreeMap::new(),
            total_procurement: Money::zero(),
            hpcl_payments: Money::zero(),
            closing_tanks: None,
            hpcl_outstanding: HpclOutstanding::not_reported(),
            completion: CompletionStatus::Empty,
            unrecognized_shifts: Vec::new(),
        }
    }

    /// Totals for one shift, if any entry was made for it
    pub fn shift(&self, shift: &Shift) -> Option<&ShiftTotals> {
        self.shifts.get(shift)
    }

    /// Sales of one product across all shifts
    pub fn fuel_sales(&self, fuel: FuelType) -> Money {
        self.shifts
            .values()
            .map(|s| s.fuel_line(fuel).amount())
            .sum()
    }

    /// Procurement amount for one product
    pub fn procurement_for(&self, fuel: FuelType) -> Money {
        self.procurement
            .get(&fuel)
            .map(|line| line.amount())
            .unwrap_or_default()
    }

    /// True when at least one key had more than one entry
    pub fn has_duplicates(&self) -> bool {
        self.shifts.values().any(|s| s.entry_count > 1)
    }

    pub fn entry_count(&self) -> usize {
        self.shifts.values().map(|s| s.entry_count).sum()
    }
}

/// Aggregate shift entries and procurement into one row per date in `[start, end]`
///
/// Only entries dated inside the range count toward totals. Entries dated
/// before `start` are still consulted for the HPCL outstanding carry-forward,
/// so callers should pass everything up to `end`.
pub fn aggregate(
    shift_records: &[ShiftRecord],
    procurement_records: &[ProcurementRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> LedgerResult<Vec<AggregatedDayTotals>> {
    if end < start {
        return Err(LedgerError::InvalidDateRange { start, end });
    }

    let mut days: BTreeMap<NaiveDate, AggregatedDayTotals> = BTreeMap::new();
    let mut date = start;
    while date <= end {
        days.insert(date, AggregatedDayTotals::empty(date));
        date += Duration::days(1);
    }

    // Closing tanks come from the latest entry of each date
    let mut ordered: Vec<&ShiftRecord> = shift_records
        .iter()
        .filter(|r| r.date >= start && r.date <= end)
        .collect();
    ordered.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.shift.cmp(&b.shift))
            .then_with(|| a.created_at.cmp(&b.created_at))
    });

    for record in ordered {
        let Some(day) = days.get_mut(&record.date) else {
            continue;
        };
        day.shifts
            .entry(record.shift.clone())
            .or_insert_with(|| ShiftTotals::empty(record.shift.clone()))
            .absorb(record);
        if !record.tanks.is_empty() {
            day.closing_tanks = Some(record.tanks);
        }
    }

    for invoice in procurement_records
        .iter()
        .filter(|p| p.invoice_date >= start && p.invoice_date <= end)
    {
        if let Some(day) = days.get_mut(&invoice.invoice_date) {
            let line = day.procurement.entry(invoice.fuel_type).or_default();
            *line = line.merge(&invoice.line);
        }
    }

    for day in days.values_mut() {
        finalize_day(day, shift_records);
    }

    Ok(days.into_values().collect())
}

fn finalize_day(day: &mut AggregatedDayTotals, all_records: &[ShiftRecord]) {
    day.total_sales = day.shifts.values().map(ShiftTotals::total_sales).sum();
    day.collections = day
        .shifts
        .values()
        .fold(Collections::default(), |acc, s| acc + s.collections);
    day.total_collections = day.collections.total();
    day.variance = day.total_sales - day.total_collections;
    day.hpcl_payments = day.shifts.values().map(|s| s.hpcl_payment).sum();
    day.total_procurement = day.procurement.values().map(|l| l.amount()).sum();

    day.completion = CompletionStatus::from_presence(
        day.shifts.contains_key(&Shift::Day),
        day.shifts.contains_key(&Shift::Night),
    );
    day.unrecognized_shifts = day
        .shifts
        .keys()
        .filter(|s| !s.is_recognized())
        .map(|s| s.label().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    day.hpcl_outstanding = resolve_hpcl_outstanding(all_records, day.date);
}

/// Loads snapshots from storage and aggregates them
pub struct AggregationService<'a> {
    storage: &'a Storage,
}

impl<'a> AggregationService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Day totals for `[start, end]`, oldest first
    pub fn aggregate_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> LedgerResult<Vec<AggregatedDayTotals>> {
        if end < start {
            return Err(LedgerError::InvalidDateRange { start, end });
        }
        let shifts: Vec<_> = self
            .storage
            .shifts
            .get_all()?
            .into_iter()
            .filter(|r| r.date <= end)
            .collect();
        let procurement = self.storage.procurement.get_by_date_range(start, end)?;

        let days = aggregate(&shifts, &procurement, start, end)?;
        tracing::debug!(
            %start,
            %end,
            days = days.len(),
            entries = shifts.len(),
            "aggregated shift entries"
        );
        Ok(days)
    }

    /// Totals for a single date
    pub fn aggregate_day(&self, date: NaiveDate) -> LedgerResult<AggregatedDayTotals> {
        self.aggregate_range(date, date)?
            .into_iter()
            .next()
            .ok_or(LedgerError::InvalidDateRange {
                start: date,
                end: date,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    /// An entry with fixed amounts, as legacy rows carry them
    fn entry(
        d: &str,
        shift: Shift,
        ms: i64,
        hsd: i64,
        power: i64,
        cash: i64,
        card: i64,
        paytm: i64,
        hp: i64,
    ) -> ShiftRecord {
        let mut record = ShiftRecord::new(date(d), shift, "Manager");
        record.ms = FuelLine::with_amount(Money::from_rupees(ms));
        record.hsd = FuelLine::with_amount(Money::from_rupees(hsd));
        record.power = FuelLine::with_amount(Money::from_rupees(power));
        record.collections = Collections {
            cash: Money::from_rupees(cash),
            card: Money::from_rupees(card),
            paytm: Money::from_rupees(paytm),
            hp_transactions: Money::from_rupees(hp),
        };
        record
    }

    #[test]
    fn test_empty_input_yields_empty_days() {
        let days = aggregate(&[], &[], date("2025-08-01"), date("2025-08-03")).unwrap();
        assert_eq!(days.len(), 3);
        for day in &days {
            assert_eq!(day.total_sales, Money::zero());
            assert_eq!(day.total_collections, Money::zero());
            assert_eq!(day.total_procurement, Money::zero());
            assert_eq!(day.completion, CompletionStatus::Empty);
            assert!(!day.hpcl_outstanding.is_reported());
        }
        assert_eq!(days[0].date, date("2025-08-01"));
        assert_eq!(days[2].date, date("2025-08-03"));
    }

    #[test]
    fn test_inverted_range_is_an_error() {
        let err = aggregate(&[], &[], date("2025-08-05"), date("2025-08-01")).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_single_day_shift_is_partial() {
        let records = vec![entry("2025-08-01", Shift::Day, 1000, 2000, 0, 2500, 400, 0, 0)];
        let days = aggregate(&records, &[], date("2025-08-01"), date("2025-08-01")).unwrap();

        let day = &days[0];
        assert_eq!(day.total_sales, Money::from_rupees(3000));
        assert_eq!(day.total_collections, Money::from_rupees(2900));
        assert_eq!(day.variance, Money::from_rupees(100));
        assert_eq!(day.completion, CompletionStatus::Partial);
    }

    #[test]
    fn test_adding_night_shift_completes_day() {
        let records = vec![
            entry("2025-08-01", Shift::Day, 1000, 2000, 0, 2500, 400, 0, 0),
            entry("2025-08-01", Shift::Night, 500, 0, 0, 300, 100, 50, 50),
        ];
        let days = aggregate(&records, &[], date("2025-08-01"), date("2025-08-01")).unwrap();

        let day = &days[0];
        assert_eq!(day.completion, CompletionStatus::Complete);
        assert_eq!(day.total_sales, Money::from_rupees(3500));
        assert_eq!(day.total_collections, Money::from_rupees(3400));
        assert_eq!(day.shift(&Shift::Night).unwrap().total_sales(), Money::from_rupees(500));
    }

    #[test]
    fn test_duplicates_sum_like_a_merged_entry() {
        let a = entry("2025-08-01", Shift::Day, 1000, 200, 30, 900, 100, 10, 1);
        let b = entry("2025-08-01", Shift::Day, 400, 50, 5, 300, 20, 2, 3);
        let merged = entry("2025-08-01", Shift::Day, 1400, 250, 35, 1200, 120, 12, 4);

        let range = (date("2025-08-01"), date("2025-08-01"));
        let separate = aggregate(&[a, b], &[], range.0, range.1).unwrap();
        let combined = aggregate(&[merged], &[], range.0, range.1).unwrap();

        assert_eq!(separate[0].total_sales, combined[0].total_sales);
        assert_eq!(separate[0].total_collections, combined[0].total_collections);
        assert_eq!(separate[0].collections, combined[0].collections);
        assert_eq!(separate[0].completion, combined[0].completion);
        assert!(separate[0].has_duplicates());
        assert_eq!(separate[0].entry_count(), 2);
    }

    #[test]
    fn test_duplicates_with_rates_sum_amounts() {
        let mut a = ShiftRecord::new(date("2025-08-01"), Shift::Day, "A");
        a.ms = FuelLine::new(100.0, 10.0);
        let mut b = ShiftRecord::new(date("2025-08-01"), Shift::Day, "B");
        b.ms = FuelLine::new(102.0, 5.0);

        let days = aggregate(&[a, b], &[], date("2025-08-01"), date("2025-08-01")).unwrap();
        let day_shift = days[0].shift(&Shift::Day).unwrap();
        assert_eq!(day_shift.ms.amount(), Money::from_rupees(1510));
        assert_eq!(day_shift.ms.quantity, 15.0);
    }

    #[test]
    fn test_unrecognized_shift_counts_toward_totals_only() {
        let records = vec![
            entry("2025-08-01", Shift::Day, 100, 0, 0, 100, 0, 0, 0),
            entry("2025-08-01", Shift::from_label("Evening"), 50, 0, 0, 0, 0, 0, 0),
        ];
        let days = aggregate(&records, &[], date("2025-08-01"), date("2025-08-01")).unwrap();

        let day = &days[0];
        assert_eq!(day.total_sales, Money::from_rupees(150));
        assert_eq!(day.completion, CompletionStatus::Partial);
        assert_eq!(day.unrecognized_shifts, vec!["Evening".to_string()]);
    }

    #[test]
    fn test_records_outside_range_are_ignored() {
        let records = vec![
            entry("2025-07-31", Shift::Night, 999, 0, 0, 0, 0, 0, 0),
            entry("2025-08-02", Shift::Day, 100, 0, 0, 0, 0, 0, 0),
        ];
        let days = aggregate(&records, &[], date("2025-08-01"), date("2025-08-01")).unwrap();
        assert_eq!(days[0].total_sales, Money::zero());
        assert_eq!(days[0].completion, CompletionStatus::Empty);
    }

    #[test]
    fn test_procurement_by_fuel_type() {
        let invoices = vec![
            ProcurementRecord::new("INV-1", date("2025-08-01"), FuelType::Ms, 9000.0, 100.0),
            ProcurementRecord::new("INV-2", date("2025-08-01"), FuelType::Hsd, 12000.0, 90.0),
            ProcurementRecord::new("INV-3", date("2025-08-01"), FuelType::Hsd, 1000.0, 90.0),
            ProcurementRecord::new("INV-4", date("2025-08-02"), FuelType::Power, 1000.0, 110.0),
        ];
        let days = aggregate(&[], &invoices, date("2025-08-01"), date("2025-08-02")).unwrap();

        assert_eq!(days[0].procurement_for(FuelType::Ms), Money::from_rupees(900_000));
        assert_eq!(days[0].procurement_for(FuelType::Hsd), Money::from_rupees(1_170_000));
        assert_eq!(days[0].procurement_for(FuelType::Power), Money::zero());
        assert_eq!(days[0].total_procurement, Money::from_rupees(2_070_000));
        assert_eq!(days[1].total_procurement, Money::from_rupees(110_000));
    }

    #[test]
    fn test_hpcl_outstanding_carried_into_each_day() {
        let mut reported = entry("2025-07-30", Shift::Night, 0, 0, 0, 0, 0, 0, 0);
        reported.set_total_outstanding(Money::from_rupees(5000));

        let days = aggregate(&[reported], &[], date("2025-08-01"), date("2025-08-02")).unwrap();
        for day in &days {
            assert_eq!(day.hpcl_outstanding.amount, Money::from_rupees(5000));
            assert!(day.hpcl_outstanding.is_carried_forward);
        }
    }

    #[test]
    fn test_closing_tanks_from_latest_entry() {
        let mut day = entry("2025-08-01", Shift::Day, 0, 0, 0, 0, 0, 0, 0);
        day.tanks.hsd1 = 5000.0;
        let mut night = entry("2025-08-01", Shift::Night, 0, 0, 0, 0, 0, 0, 0);
        night.tanks.hsd1 = 4200.0;

        let days = aggregate(&[night, day], &[], date("2025-08-01"), date("2025-08-01")).unwrap();
        assert_eq!(days[0].closing_tanks.unwrap().hsd1, 4200.0);
    }
}
