//! Variance and HPCL carry-forward reconciliation
//!
//! Pure functions over snapshots of shift entries and day totals. Nothing in
//! here touches storage, so every rule can be exercised with plain vectors.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{CompletionStatus, Money, Shift, ShiftRecord};

use super::aggregation::AggregatedDayTotals;

/// HPCL credit balance applicable to a date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HpclOutstanding {
    pub amount: Money,
    /// Date of the entry the figure came from
    pub entry_date: Option<NaiveDate>,
    /// True when the figure was reported on an earlier date
    pub is_carried_forward: bool,
}

impl HpclOutstanding {
    /// Nothing reported on or before the target date
    pub fn not_reported() -> Self {
        Self {
            amount: Money::zero(),
            entry_date: None,
            is_carried_forward: false,
        }
    }

    pub fn is_reported(&self) -> bool {
        self.entry_date.is_some()
    }
}

impl Default for HpclOutstanding {
    fn default() -> Self {
        Self::not_reported()
    }
}

/// Sales minus collections for a day; positive means money is short
pub fn variance(day: &AggregatedDayTotals) -> Money {
    day.total_sales - day.total_collections
}

/// Sum of variances across a range
pub fn total_variance(days: &[AggregatedDayTotals]) -> Money {
    days.iter().map(variance).sum()
}

/// Mean variance across every day in the list, 0 for an empty list
///
/// Days without entries count as zero-variance days.
pub fn average_variance(days: &[AggregatedDayTotals]) -> Money {
    if days.is_empty() {
        return Money::zero();
    }
    total_variance(days).div_round(days.len())
}

/// Latest reported HPCL outstanding on or before `target`
///
/// Entries with no figure (or a zero figure) are skipped. When several
/// entries on the same date carry a figure, the one created last wins.
/// Input order does not matter.
pub fn resolve_hpcl_outstanding(records: &[ShiftRecord], target: NaiveDate) -> HpclOutstanding {
    let latest = records
        .iter()
        .filter(|r| r.date <= target)
        .filter_map(|r| r.reported_outstanding().map(|amount| (r, amount)))
        .max_by(|(a, _), (b, _)| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });

    match latest {
        Some((record, amount)) => {
            let is_carried_forward = record.date < target;
            if is_carried_forward {
                tracing::debug!(
                    %target,
                    from = %record.date,
                    %amount,
                    "carrying HPCL outstanding forward"
                );
            }
            HpclOutstanding {
                amount,
                entry_date: Some(record.date),
                is_carried_forward,
            }
        }
        None => HpclOutstanding::not_reported(),
    }
}

/// Completion status of one calendar date from its shift entries
pub fn completion_status(records: &[ShiftRecord], date: NaiveDate) -> CompletionStatus {
    let on_date = || records.iter().filter(move |r| r.date == date);
    CompletionStatus::from_presence(
        on_date().any(|r| r.shift == Shift::Day),
        on_date().any(|r| r.shift == Shift::Night),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Collections, FuelLine};
    use crate::services::aggregation::aggregate;
    use chrono::{Duration, Utc};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn with_outstanding(d: &str, shift: Shift, rupees: i64) -> ShiftRecord {
        let mut record = ShiftRecord::new(date(d), shift, "Manager");
        record.set_total_outstanding(Money::from_rupees(rupees));
        record
    }

    fn sales_entry(d: &str, shift: Shift, sales: i64, cash: i64) -> ShiftRecord {
        let mut record = ShiftRecord::new(date(d), shift, "Manager");
        record.ms = FuelLine::with_amount(Money::from_rupees(sales));
        record.collections = Collections {
            cash: Money::from_rupees(cash),
            ..Default::default()
        };
        record
    }

    #[test]
    fn test_carry_forward_from_earlier_date() {
        let records = vec![with_outstanding("2025-08-01", Shift::Night, 5000)];
        let result = resolve_hpcl_outstanding(&records, date("2025-08-05"));

        assert_eq!(result.amount, Money::from_rupees(5000));
        assert_eq!(result.entry_date, Some(date("2025-08-01")));
        assert!(result.is_carried_forward);
    }

    #[test]
    fn test_same_day_figure_is_not_carried() {
        let records = vec![with_outstanding("2025-08-05", Shift::Day, 7000)];
        let result = resolve_hpcl_outstanding(&records, date("2025-08-05"));

        assert_eq!(result.amount, Money::from_rupees(7000));
        assert!(!result.is_carried_forward);
    }

    #[test]
    fn test_nothing_reported() {
        let records = vec![ShiftRecord::new(date("2025-08-01"), Shift::Day, "Manager")];
        let result = resolve_hpcl_outstanding(&records, date("2025-08-05"));
        assert_eq!(result, HpclOutstanding::not_reported());
        assert!(!result.is_reported());
    }

    #[test]
    fn test_future_figures_ignored() {
        let records = vec![
            with_outstanding("2025-08-01", Shift::Day, 5000),
            with_outstanding("2025-08-09", Shift::Day, 9000),
        ];
        let result = resolve_hpcl_outstanding(&records, date("2025-08-05"));
        assert_eq!(result.amount, Money::from_rupees(5000));
    }

    #[test]
    fn test_zero_figure_does_not_hide_older_one() {
        let records = vec![
            with_outstanding("2025-08-01", Shift::Day, 5000),
            with_outstanding("2025-08-03", Shift::Day, 0),
        ];
        let result = resolve_hpcl_outstanding(&records, date("2025-08-04"));
        assert_eq!(result.amount, Money::from_rupees(5000));
        assert_eq!(result.entry_date, Some(date("2025-08-01")));
    }

    #[test]
    fn test_same_date_latest_created_wins() {
        let mut first = with_outstanding("2025-08-02", Shift::Night, 4000);
        let mut second = with_outstanding("2025-08-02", Shift::Day, 4500);
        first.created_at = Utc::now() - Duration::hours(2);
        second.created_at = Utc::now();

        // Order of input must not matter
        let result = resolve_hpcl_outstanding(&[second.clone(), first.clone()], date("2025-08-02"));
        assert_eq!(result.amount, Money::from_rupees(4500));
        let result = resolve_hpcl_outstanding(&[first, second], date("2025-08-02"));
        assert_eq!(result.amount, Money::from_rupees(4500));
    }

    #[test]
    fn test_variance_and_average() {
        let records = vec![
            sales_entry("2025-08-01", Shift::Day, 3000, 2900),
            sales_entry("2025-08-02", Shift::Day, 1000, 1300),
        ];
        let days = aggregate(&records, &[], date("2025-08-01"), date("2025-08-03")).unwrap();

        assert_eq!(variance(&days[0]), Money::from_rupees(100));
        assert_eq!(variance(&days[1]), Money::from_rupees(-300));
        assert_eq!(variance(&days[2]), Money::zero());
        assert_eq!(total_variance(&days), Money::from_rupees(-200));
        // -200 / 3 days
        assert_eq!(average_variance(&days), Money::from_paise(-6667));
    }

    #[test]
    fn test_average_of_empty_list() {
        assert_eq!(average_variance(&[]), Money::zero());
    }

    #[test]
    fn test_completion_status() {
        let records = vec![
            sales_entry("2025-08-01", Shift::Day, 0, 0),
            sales_entry("2025-08-01", Shift::Night, 0, 0),
            sales_entry("2025-08-02", Shift::Night, 0, 0),
            sales_entry("2025-08-03", Shift::from_label("Evening"), 0, 0),
        ];
        assert_eq!(completion_status(&records, date("2025-08-01")), CompletionStatus::Complete);
        assert_eq!(completion_status(&records, date("2025-08-02")), CompletionStatus::Partial);
        assert_eq!(completion_status(&records, date("2025-08-03")), CompletionStatus::Empty);
        assert_eq!(completion_status(&records, date("2025-08-04")), CompletionStatus::Empty);
    }
}
