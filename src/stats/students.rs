// src/stats/students.rs
//! FLCE registration statistics

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::{percentage, GroupCount, GroupCounts, TimingCounts};
use crate::config::ClefConfig;
use crate::entity::{Gender, RecordKind, Student};
use crate::temporal::age_on;

const AGE_BUCKETS: [(&str, i32); 3] = [("<=20", 20), ("21-30", 30), ("31-50", 50)];
const AGE_BUCKET_OVERFLOW: &str = "51+";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub enrolled: usize,
    pub pre_registered: usize,
    pub lead: usize,
    pub left: usize,
}

impl StatusCounts {
    fn add(&mut self, kind: RecordKind) {
        match kind {
            RecordKind::Enrolled => self.enrolled += 1,
            RecordKind::PreRegistered => self.pre_registered += 1,
            RecordKind::Lead => self.lead += 1,
            RecordKind::Left => self.left += 1,
        }
    }

    pub fn get(&self, kind: RecordKind) -> usize {
        match kind {
            RecordKind::Enrolled => self.enrolled,
            RecordKind::PreRegistered => self.pre_registered,
            RecordKind::Lead => self.lead,
            RecordKind::Left => self.left,
        }
    }

    pub fn total(&self) -> usize {
        self.enrolled + self.pre_registered + self.lead + self.left
    }
}

/// Share of each status in the whole student base, as rounded percentages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusRates {
    /// Enrolled over total, shown as the conversion rate
    pub conversion: u32,
    pub pre_registered: u32,
    pub lead: u32,
    pub left: u32,
}

impl StatusRates {
    fn from_counts(counts: &StatusCounts, total: usize) -> Self {
        Self {
            conversion: percentage(counts.enrolled, total),
            pre_registered: percentage(counts.pre_registered, total),
            lead: percentage(counts.lead, total),
            left: percentage(counts.left, total),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GenderCounts {
    pub male: usize,
    pub female: usize,
    pub other: usize,
    pub unknown: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AuPairCounts {
    pub yes: usize,
    pub no: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentStats {
    pub today: NaiveDate,
    pub total: usize,
    pub status: StatusCounts,
    pub rates: StatusRates,
    pub gender: GenderCounts,
    pub au_pair: AuPairCounts,
    /// Stay windows (arrival to departure) relative to `today`
    pub stays: TimingCounts,
    pub classes: Vec<GroupCount>,
    pub birth_places: Vec<GroupCount>,
    pub age_buckets: Vec<GroupCount>,
    /// Arrivals per calendar month, all years merged
    pub arrivals: [usize; 12],
}

impl StudentStats {
    pub fn compute(students: &[Student], today: NaiveDate, config: &ClefConfig) -> Self {
        let mut status = StatusCounts::default();
        let mut gender = GenderCounts::default();
        let mut au_pair = AuPairCounts::default();
        let mut classes = GroupCounts::new();
        let mut birth_places = GroupCounts::new();
        let mut ages = [0usize; AGE_BUCKETS.len() + 1];
        let mut arrivals = [0usize; 12];

        for student in students {
            let d = &student.details;
            status.add(student.record_kind());

            match d.gender {
                Some(Gender::M) => gender.male += 1,
                Some(Gender::F) => gender.female += 1,
                Some(Gender::X) => gender.other += 1,
                None => gender.unknown += 1,
            }

            if d.is_au_pair {
                au_pair.yes += 1;
            } else {
                au_pair.no += 1;
            }

            if let Some(code) = d.class_code.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
                classes.add(code.to_uppercase());
            }
            if let Some(place) = d.birth_place.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
                birth_places.add(place);
            }

            if let Some(birth) = d.birth_date {
                ages[age_bucket(age_on(birth, today))] += 1;
            }

            if let Some(arrival) = d.arrival_date {
                arrivals[arrival.month0() as usize] += 1;
            }
        }

        let age_buckets = AGE_BUCKETS
            .iter()
            .map(|(label, _)| *label)
            .chain(std::iter::once(AGE_BUCKET_OVERFLOW))
            .zip(ages)
            .map(|(label, count)| GroupCount {
                label: label.to_string(),
                count,
            })
            .collect();

        let total = students.len();
        Self {
            today,
            total,
            status,
            rates: StatusRates::from_counts(&status, total),
            gender,
            au_pair,
            stays: TimingCounts::tally(students, today),
            classes: classes.top_with_rest(config.top_groups, &config.other_label),
            birth_places: birth_places.top_with_rest(config.top_groups, &config.other_label),
            age_buckets,
            arrivals,
        }
    }
}

fn age_bucket(age: i32) -> usize {
    AGE_BUCKETS
        .iter()
        .position(|(_, upper)| age <= *upper)
        .unwrap_or(AGE_BUCKETS.len())
}
