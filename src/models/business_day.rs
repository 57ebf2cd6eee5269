//! Business day and shift boundaries
//!
//! The outlet runs on an operating day from 08:30 to 08:30 the next calendar
//! day, split into a day shift (08:30 to 20:30) and a night shift (20:30 to
//! 08:30, spanning midnight). All functions here work on local wall-clock
//! values (`NaiveDateTime`) and take "now" as an argument, so they are pure.

use chrono::{Days, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label a manager puts on a shift entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Shift {
    /// 08:30 to 20:30
    Day,
    /// 20:30 to 08:30 next calendar day
    Night,
    /// Any label that is neither "Day" nor "Night"
    Unrecognized(String),
}

impl Shift {
    /// Parse a free-text label; unknown labels are kept verbatim
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "day" => Self::Day,
            "night" => Self::Night,
            _ => Self::Unrecognized(label.trim().to_string()),
        }
    }

    /// Whether this is one of the two known shifts
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }

    /// The label as stored
    pub fn label(&self) -> &str {
        match self {
            Self::Day => "Day",
            Self::Night => "Night",
            Self::Unrecognized(label) => label,
        }
    }
}

impl From<String> for Shift {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<Shift> for String {
    fn from(shift: Shift) -> Self {
        shift.label().to_string()
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// How many of a business day's two shifts have been entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompletionStatus {
    /// Neither shift entered
    Empty,
    /// Exactly one of Day / Night entered
    Partial,
    /// Both shifts entered
    Complete,
}

impl CompletionStatus {
    /// Derive the status from the presence of each shift
    pub fn from_presence(has_day: bool, has_night: bool) -> Self {
        match (has_day, has_night) {
            (true, true) => Self::Complete,
            (false, false) => Self::Empty,
            _ => Self::Partial,
        }
    }
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Empty => "EMPTY",
            Self::Partial => "PARTIAL",
            Self::Complete => "COMPLETE",
        };
        f.pad(label)
    }
}

/// Shift cutover times for the station
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftSchedule {
    /// Start of the business day and of the day shift
    pub day_start: NaiveTime,
    /// Start of the night shift
    pub night_start: NaiveTime,
}

impl Default for ShiftSchedule {
    fn default() -> Self {
        Self {
            day_start: NaiveTime::from_hms_opt(8, 30, 0).unwrap_or(NaiveTime::MIN),
            night_start: NaiveTime::from_hms_opt(20, 30, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl ShiftSchedule {
    /// Create a schedule, rejecting a night start that is not after the day start
    pub fn new(day_start: NaiveTime, night_start: NaiveTime) -> Result<Self, ScheduleError> {
        if night_start <= day_start {
            return Err(ScheduleError {
                day_start,
                night_start,
            });
        }
        Ok(Self {
            day_start,
            night_start,
        })
    }

    /// Business day owning a timestamp
    ///
    /// At or after the day start the business day is the timestamp's own date;
    /// before it, the timestamp still belongs to the previous day's night shift.
    pub fn resolve_business_day(&self, ts: NaiveDateTime) -> NaiveDate {
        if ts.time() >= self.day_start {
            ts.date()
        } else {
            ts.date() - Duration::days(1)
        }
    }

    /// Business day in progress at `now`
    pub fn current_business_day(&self, now: NaiveDateTime) -> NaiveDate {
        self.resolve_business_day(now)
    }

    /// Night shift covers [night_start, 24:00) and [00:00, day_start)
    pub fn is_night_shift(&self, ts: NaiveDateTime) -> bool {
        let t = ts.time();
        t >= self.night_start || t < self.day_start
    }

    /// Shift in progress at a timestamp
    pub fn shift_for(&self, ts: NaiveDateTime) -> Shift {
        if self.is_night_shift(ts) {
            Shift::Night
        } else {
            Shift::Day
        }
    }

    /// Boundaries and labels of one business day
    pub fn describe_business_day(&self, date: NaiveDate) -> BusinessDayWindow {
        BusinessDayWindow {
            business_date: date,
            shift_start: date.and_time(self.day_start),
            shift_change: date.and_time(self.night_start),
            shift_end: (date + Duration::days(1)).and_time(self.day_start),
            day_shift_label: format!(
                "Day Shift ({} - {})",
                clock_label(self.day_start),
                clock_label(self.night_start)
            ),
            night_shift_label: format!(
                "Night Shift ({} - {})",
                clock_label(self.night_start),
                clock_label(self.day_start)
            ),
        }
    }
}

fn clock_label(t: NaiveTime) -> String {
    t.format("%-I:%M %p").to_string()
}

/// Invalid shift schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleError {
    pub day_start: NaiveTime,
    pub night_start: NaiveTime,
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Night shift start {} must be after day shift start {}",
            self.night_start, self.day_start
        )
    }
}

impl std::error::Error for ScheduleError {}

/// One operating cycle: [shift_start, shift_end), split at shift_change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessDayWindow {
    pub business_date: NaiveDate,
    pub shift_start: NaiveDateTime,
    /// First instant of the night shift
    pub shift_change: NaiveDateTime,
    pub shift_end: NaiveDateTime,
    pub day_shift_label: String,
    pub night_shift_label: String,
}

impl BusinessDayWindow {
    /// Whether a timestamp falls inside this business day
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        ts >= self.shift_start && ts < self.shift_end
    }

    /// Day shift interval, end exclusive
    pub fn day_shift(&self) -> (NaiveDateTime, NaiveDateTime) {
        (self.shift_start, self.shift_change)
    }

    /// Night shift interval, end exclusive
    pub fn night_shift(&self) -> (NaiveDateTime, NaiveDateTime) {
        (self.shift_change, self.shift_end)
    }
}

/// [`ShiftSchedule::resolve_business_day`] with the standard 08:30 cutover
pub fn resolve_business_day(ts: NaiveDateTime) -> NaiveDate {
    ShiftSchedule::default().resolve_business_day(ts)
}

/// [`ShiftSchedule::current_business_day`] with the standard schedule
pub fn current_business_day(now: NaiveDateTime) -> NaiveDate {
    ShiftSchedule::default().current_business_day(now)
}

/// [`ShiftSchedule::is_night_shift`] with the standard schedule
pub fn is_night_shift(ts: NaiveDateTime) -> bool {
    ShiftSchedule::default().is_night_shift(ts)
}

/// [`ShiftSchedule::describe_business_day`] with the standard schedule
pub fn describe_business_day(date: NaiveDate) -> BusinessDayWindow {
    ShiftSchedule::default().describe_business_day(date)
}

/// First date of a `days`-long window ending on `end`, inclusive
///
/// A zero-length window is treated as one day. None when the start would
/// fall before the earliest representable date.
pub fn lookback_start(end: NaiveDate, days: u32) -> Option<NaiveDate> {
    end.checked_sub_days(Days::new(u64::from(days.max(1) - 1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookback_start() {
        let end = NaiveDate::from_ymd_opt(2025, 8, 10).unwrap();
        assert_eq!(lookback_start(end, 7), NaiveDate::from_ymd_opt(2025, 8, 4));
        assert_eq!(lookback_start(end, 0), Some(end));
        assert_eq!(lookback_start(end, 1), Some(end));
        assert_eq!(lookback_start(NaiveDate::MIN, 2), None);
    }

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_just_before_cutover_belongs_to_previous_day() {
        let t = ts("2025-08-05T08:29:59");
        assert_eq!(resolve_business_day(t), date("2025-08-04"));
        assert!(is_night_shift(t));
    }

    #[test]
    fn test_cutover_instant_starts_day_shift() {
        let t = ts("2025-08-05T08:30:00");
        assert_eq!(resolve_business_day(t), date("2025-08-05"));
        assert!(!is_night_shift(t));
        assert_eq!(ShiftSchedule::default().shift_for(t), Shift::Day);
    }

    #[test]
    fn test_night_shift_starts_at_2030() {
        assert!(!is_night_shift(ts("2025-08-05T20:29:59")));
        assert!(is_night_shift(ts("2025-08-05T20:30:00")));
        assert_eq!(resolve_business_day(ts("2025-08-05T23:59:59")), date("2025-08-05"));
    }

    #[test]
    fn test_day_hours_map_to_same_date() {
        for hour in 9..20 {
            let t = date("2025-08-05").and_hms_opt(hour, 15, 0).unwrap();
            assert_eq!(resolve_business_day(t), date("2025-08-05"));
            assert!(!is_night_shift(t));
        }
    }

    #[test]
    fn test_early_morning_maps_to_previous_date() {
        for hour in 0..8 {
            let t = date("2025-08-05").and_hms_opt(hour, 45, 0).unwrap();
            assert_eq!(resolve_business_day(t), date("2025-08-04"));
            assert!(is_night_shift(t));
        }
    }

    #[test]
    fn test_sub_minute_precision_does_not_change_day() {
        let base = date("2025-08-05").and_hms_opt(8, 30, 0).unwrap();
        let with_millis = date("2025-08-05").and_hms_milli_opt(8, 30, 59, 999).unwrap();
        assert_eq!(resolve_business_day(base), resolve_business_day(with_millis));
    }

    #[test]
    fn test_midnight_rollover_across_month() {
        let t = ts("2025-09-01T00:10:00");
        assert_eq!(resolve_business_day(t), date("2025-08-31"));
        assert_eq!(current_business_day(t), date("2025-08-31"));
    }

    #[test]
    fn test_describe_business_day() {
        let window = describe_business_day(date("2025-08-05"));
        assert_eq!(window.shift_start, ts("2025-08-05T08:30:00"));
        assert_eq!(window.shift_change, ts("2025-08-05T20:30:00"));
        assert_eq!(window.shift_end, ts("2025-08-06T08:30:00"));
        assert_eq!(window.day_shift_label, "Day Shift (8:30 AM - 8:30 PM)");
        assert_eq!(window.night_shift_label, "Night Shift (8:30 PM - 8:30 AM)");

        assert!(window.contains(ts("2025-08-06T08:29:59")));
        assert!(!window.contains(ts("2025-08-06T08:30:00")));
        assert_eq!(window.night_shift().0, window.day_shift().1);
    }

    #[test]
    fn test_window_agrees_with_resolver() {
        let window = describe_business_day(date("2025-08-05"));
        for t in [
            ts("2025-08-05T08:30:00"),
            ts("2025-08-05T14:00:00"),
            ts("2025-08-05T22:00:00"),
            ts("2025-08-06T03:00:00"),
        ] {
            assert!(window.contains(t));
            assert_eq!(resolve_business_day(t), window.business_date);
        }
    }

    #[test]
    fn test_custom_schedule() {
        let schedule = ShiftSchedule::new(
            NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        )
        .unwrap();
        assert_eq!(
            schedule.resolve_business_day(ts("2025-08-05T06:30:00")),
            date("2025-08-05")
        );
        assert!(schedule.is_night_shift(ts("2025-08-05T18:00:00")));

        let inverted = ShiftSchedule::new(
            NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        );
        assert!(inverted.is_err());
    }

    #[test]
    fn test_shift_labels() {
        assert_eq!(Shift::from_label("Day"), Shift::Day);
        assert_eq!(Shift::from_label(" night "), Shift::Night);
        assert_eq!(
            Shift::from_label("Morning"),
            Shift::Unrecognized("Morning".to_string())
        );
        assert!(!Shift::from_label("Evening").is_recognized());

        let json = serde_json::to_string(&Shift::Night).unwrap();
        assert_eq!(json, "\"Night\"");
        let parsed: Shift = serde_json::from_str("\"Swing\"").unwrap();
        assert_eq!(parsed.label(), "Swing");
    }

    #[test]
    fn test_completion_from_presence() {
        assert_eq!(CompletionStatus::from_presence(false, false), CompletionStatus::Empty);
        assert_eq!(CompletionStatus::from_presence(true, false), CompletionStatus::Partial);
        assert_eq!(CompletionStatus::from_presence(false, true), CompletionStatus::Partial);
        assert_eq!(CompletionStatus::from_presence(true, true), CompletionStatus::Complete);
        assert_eq!(CompletionStatus::Complete.to_string(), "COMPLETE");
    }
}
