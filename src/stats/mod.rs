// src/stats/mod.rs
//! Aggregation over in-memory record snapshots.
//!
//! Every function here takes an already-loaded slice plus a fixed "today"
//! and returns fresh values; nothing is cached between calls.

mod posts;
mod students;

pub use posts::{CategoryCount, PostPreview, PostStats};
pub use students::{AuPairCounts, GenderCounts, StatusCounts, StatusRates, StudentStats};

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::temporal::{week_window, DayRange, Scheduled};

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// `part` as a rounded percentage of `whole`; 0 when `whole` is 0
pub fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    (100.0 * part as f64 / whole as f64).round() as u32
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub label: String,
    pub count: usize,
}

/// Counts keyed by an arbitrary string, remembering first-seen order.
#[derive(Debug, Clone, Default)]
pub struct GroupCounts {
    groups: Vec<GroupCount>,
    index: HashMap<String, usize>,
}

impl GroupCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: impl Into<String>) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&i) => self.groups[i].count += 1,
            None => {
                self.index.insert(key.clone(), self.groups.len());
                self.groups.push(GroupCount {
                    label: key,
                    count: 1,
                });
            }
        }
    }

    pub fn get(&self, key: &str) -> usize {
        self.index.get(key).map(|&i| self.groups[i].count).unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.groups.iter().map(|g| g.count).sum()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &GroupCount> {
        self.groups.iter()
    }

    /// Count descending; ties keep first-seen order
    pub fn ranked(&self) -> Vec<GroupCount> {
        let mut ranked = self.groups.clone();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked
    }

    pub fn top(&self, n: usize) -> Vec<GroupCount> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }

    /// Top `n` groups plus one `other_label` group summing the remainder
    /// (only added when something was cut).
    pub fn top_with_rest(&self, n: usize, other_label: &str) -> Vec<GroupCount> {
        let mut ranked = self.ranked();
        if ranked.len() <= n {
            return ranked;
        }

        let rest: usize = ranked[n..].iter().map(|g| g.count).sum();
        ranked.truncate(n);
        ranked.push(GroupCount {
            label: other_label.to_string(),
            count: rest,
        });
        ranked
    }
}

impl<S: Into<String>> FromIterator<S> for GroupCounts {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut counts = GroupCounts::new();
        for key in iter {
            counts.add(key);
        }
        counts
    }
}

/// Group records by a string key; records mapping to `None` are not counted
pub fn group_by<T, F>(items: &[T], key: F) -> GroupCounts
where
    F: Fn(&T) -> Option<String>,
{
    items.iter().filter_map(key).collect()
}

/// Twelve month buckets for one calendar year
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyBuckets {
    pub year: i32,
    pub counts: [usize; 12],
}

impl MonthlyBuckets {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            counts: [0; 12],
        }
    }

    /// Count `day` in its month; days from other years are ignored
    pub fn add(&mut self, day: NaiveDate) -> bool {
        if day.year() != self.year {
            return false;
        }
        self.counts[day.month0() as usize] += 1;
        true
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn labeled(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        MONTH_LABELS.iter().copied().zip(self.counts.iter().copied())
    }
}

/// Active / upcoming / past / this-week counts for one reference day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimingCounts {
    pub active_today: usize,
    pub upcoming: usize,
    pub past: usize,
    pub this_week: usize,
}

impl TimingCounts {
    /// Records without a usable date range are skipped
    pub fn tally<'a, S, I>(records: I, today: NaiveDate) -> Self
    where
        S: Scheduled + 'a,
        I: IntoIterator<Item = &'a S>,
    {
        let week = week_window(today);
        let mut counts = TimingCounts::default();
        for range in records.into_iter().filter_map(|r| r.day_range()) {
            counts.record(&range, today, &week);
        }
        counts
    }

    fn record(&mut self, range: &DayRange, today: NaiveDate, week: &DayRange) {
        if range.is_active_on(today) {
            self.active_today += 1;
        }
        if range.is_upcoming(today) {
            self.upcoming += 1;
        }
        if range.is_past(today) {
            self.past += 1;
        }
        if range.overlaps(week) {
            self.this_week += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Span(Option<DayRange>);

    impl Scheduled for Span {
        fn day_range(&self) -> Option<DayRange> {
            self.0
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_percentage_boundaries() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(5, 0), 0);
        assert_eq!(percentage(5, 10), 50);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
    }

    #[test]
    fn test_group_counts_conserve_total() {
        let keys = ["B1", "A2", "B1", "C1", "A2", "B1"];
        let counts: GroupCounts = keys.iter().copied().collect();
        assert_eq!(counts.total(), keys.len());
        assert_eq!(counts.get("B1"), 3);
        assert_eq!(counts.get("Z9"), 0);
    }

    #[test]
    fn test_ranked_ties_keep_first_seen_order() {
        let counts: GroupCounts = ["lyon", "paris", "nice", "paris", "lyon"].into_iter().collect();
        let ranked = counts.ranked();
        let labels: Vec<_> = ranked.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["lyon", "paris", "nice"]);
    }

    #[test]
    fn test_top_with_rest() {
        let counts: GroupCounts = ["a", "a", "a", "b", "b", "c", "d"].into_iter().collect();
        let top = counts.top_with_rest(2, "Others");
        assert_eq!(top.len(), 3);
        assert_eq!(top[2].label, "Others");
        assert_eq!(top[2].count, 2);
        assert_eq!(top.iter().map(|g| g.count).sum::<usize>(), counts.total());

        // nothing cut, no filler group
        assert_eq!(counts.top_with_rest(8, "Others").len(), 4);
    }

    #[test]
    fn test_group_by_skips_missing_keys() {
        let items = vec![Some("x"), None, Some("x"), Some("y")];
        let counts = group_by(&items, |i| i.map(str::to_string));
        assert_eq!(counts.total(), 3);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_monthly_buckets_ignore_other_years() {
        let mut buckets = MonthlyBuckets::new(2024);
        assert!(buckets.add(d(2024, 1, 31)));
        assert!(buckets.add(d(2024, 12, 1)));
        assert!(!buckets.add(d(2023, 12, 1)));
        assert_eq!(buckets.counts[0], 1);
        assert_eq!(buckets.counts[11], 1);
        assert_eq!(buckets.total(), 2);
        assert_eq!(buckets.labeled().next(), Some(("Jan", 1)));
    }

    #[test]
    fn test_timing_tally() {
        let today = d(2024, 1, 10);
        let spans = vec![
            Span(Some(DayRange::single(d(2024, 1, 10)))),
            Span(Some(DayRange::new(d(2024, 2, 1), Some(d(2024, 2, 5))).unwrap())),
            Span(Some(DayRange::single(d(2024, 1, 8)))),
            Span(Some(DayRange::single(d(2023, 12, 1)))),
            Span(None),
        ];
        let counts = TimingCounts::tally(&spans, today);
        assert_eq!(counts.active_today, 1);
        assert_eq!(counts.upcoming, 1);
        assert_eq!(counts.past, 2);
        // Jan 8 and Jan 10 fall in the Monday-Sunday window
        assert_eq!(counts.this_week, 2);
    }
}
