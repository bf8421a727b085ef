//! Day-granularity date logic for calendar posts and student stays.
//!
//! Nothing here reads the system clock on its own. Callers pass "today"
//! explicitly, usually obtained once from a [`Clock`].

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::error::{ClefError, Result};

/// Source of the current time
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// The current day, truncated to midnight
    fn today(&self) -> NaiveDate {
        day_of(&self.now())
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Pin the clock to midnight of `day`
    pub fn on(day: NaiveDate) -> Self {
        Self(day.and_time(chrono::NaiveTime::MIN).and_utc())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Truncate a timestamp to its day
pub fn day_of(ts: &DateTime<Utc>) -> NaiveDate {
    ts.date_naive()
}

pub fn add_days(day: NaiveDate, days: i64) -> NaiveDate {
    day + Duration::days(days)
}

pub fn is_same_day(a: &DateTime<Utc>, b: &DateTime<Utc>) -> bool {
    day_of(a) == day_of(b)
}

/// The Monday on or before `day`
pub fn start_of_week_monday(day: NaiveDate) -> NaiveDate {
    add_days(day, -i64::from(day.weekday().num_days_from_monday()))
}

/// Monday through Sunday of the week containing `today`
pub fn week_window(today: NaiveDate) -> DayRange {
    let start = start_of_week_monday(today);
    DayRange {
        start,
        end: add_days(start, 6),
    }
}

/// Whole years elapsed between `birth` and `on`
pub fn age_on(birth: NaiveDate, on: NaiveDate) -> i32 {
    let mut age = on.year() - birth.year();
    if (on.month(), on.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

/// Parse a `YYYY-MM-DD` input value
pub fn parse_day(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ClefError::InvalidDate(value.to_string()))
}

/// Where a range sits relative to a given day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timing {
    Upcoming,
    Active,
    Past,
}

/// Inclusive day range. `end >= start` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DayRange {
    /// Build a range; a missing end collapses it to a single day
    pub fn new(start: NaiveDate, end: Option<NaiveDate>) -> Result<Self> {
        let end = end.unwrap_or(start);
        if end < start {
            return Err(ClefError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn is_active_on(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.start > today
    }

    pub fn is_past(&self, today: NaiveDate) -> bool {
        self.end < today
    }

    pub fn overlaps_window(&self, window_start: NaiveDate, window_end: NaiveDate) -> bool {
        self.start <= window_end && self.end >= window_start
    }

    pub fn overlaps(&self, window: &DayRange) -> bool {
        self.overlaps_window(window.start, window.end)
    }

    pub fn timing(&self, today: NaiveDate) -> Timing {
        if self.is_upcoming(today) {
            Timing::Upcoming
        } else if self.is_past(today) {
            Timing::Past
        } else {
            Timing::Active
        }
    }
}

/// Records that occupy a span of days
pub trait Scheduled {
    fn day_range(&self) -> Option<DayRange>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_range_rejects_inverted_dates() {
        assert!(matches!(
            DayRange::new(d(2024, 2, 5), Some(d(2024, 2, 1))),
            Err(ClefError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_single_day_and_multi_day_scenario() {
        let today = d(2024, 1, 10);
        let first = DayRange::new(d(2024, 1, 10), None).unwrap();
        let second = DayRange::new(d(2024, 2, 1), Some(d(2024, 2, 5))).unwrap();

        assert!(first.is_active_on(today));
        assert!(!second.is_active_on(today));
        assert!(!first.is_upcoming(today));
        assert!(second.is_upcoming(today));
    }

    #[test]
    fn test_active_is_inclusive_on_both_ends() {
        let range = DayRange::new(d(2024, 3, 1), Some(d(2024, 3, 3))).unwrap();
        assert!(range.is_active_on(d(2024, 3, 1)));
        assert!(range.is_active_on(d(2024, 3, 3)));
        assert!(!range.is_active_on(d(2024, 3, 4)));
        assert!(!range.is_active_on(d(2024, 2, 29)));
    }

    #[test]
    fn test_classification_is_exclusive() {
        let range = DayRange::new(d(2024, 3, 1), Some(d(2024, 3, 3))).unwrap();
        let mut day = d(2024, 2, 25);
        while day <= d(2024, 3, 8) {
            let flags = [
                range.is_upcoming(day),
                range.is_active_on(day),
                range.is_past(day),
            ];
            assert_eq!(flags.iter().filter(|f| **f).count(), 1, "day {}", day);
            day = add_days(day, 1);
        }
        assert_eq!(range.timing(d(2024, 3, 2)), Timing::Active);
        assert_eq!(range.timing(d(2024, 2, 2)), Timing::Upcoming);
        assert_eq!(range.timing(d(2024, 4, 2)), Timing::Past);
    }

    #[test]
    fn test_overlaps_window() {
        let range = DayRange::new(d(2024, 3, 1), Some(d(2024, 3, 3))).unwrap();
        assert!(range.overlaps_window(d(2024, 3, 3), d(2024, 3, 10)));
        assert!(range.overlaps_window(d(2024, 2, 1), d(2024, 3, 1)));
        assert!(!range.overlaps_window(d(2024, 3, 4), d(2024, 3, 10)));
    }

    #[test]
    fn test_start_of_week_monday() {
        // 2024-01-10 is a Wednesday
        assert_eq!(start_of_week_monday(d(2024, 1, 10)), d(2024, 1, 8));
        assert_eq!(start_of_week_monday(d(2024, 1, 8)), d(2024, 1, 8));
        assert_eq!(start_of_week_monday(d(2024, 1, 14)), d(2024, 1, 8));
    }

    #[test]
    fn test_week_window_spans_seven_days() {
        let week = week_window(d(2024, 1, 10));
        assert_eq!(week.start(), d(2024, 1, 8));
        assert_eq!(week.end(), d(2024, 1, 14));
    }

    #[test]
    fn test_is_same_day_ignores_time() {
        let a = Utc.with_ymd_and_hms(2024, 5, 1, 0, 1, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 5, 1, 23, 59, 0).unwrap();
        let c = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
        assert!(is_same_day(&a, &b));
        assert!(!is_same_day(&b, &c));
    }

    #[test]
    fn test_age_on_before_and_after_birthday() {
        let birth = d(2000, 6, 15);
        assert_eq!(age_on(birth, d(2024, 6, 14)), 23);
        assert_eq!(age_on(birth, d(2024, 6, 15)), 24);
    }

    #[test]
    fn test_fixed_clock_today() {
        let clock = FixedClock::on(d(2024, 1, 10));
        assert_eq!(clock.today(), d(2024, 1, 10));
    }

    #[test]
    fn test_parse_day() {
        assert_eq!(parse_day("2024-01-10").unwrap(), d(2024, 1, 10));
        assert!(matches!(parse_day("10/01/2024"), Err(ClefError::InvalidDate(_))));
    }
}
