// src/query/students.rs
//! Student table filters and ordering

use std::cmp::Ordering;

use chrono::NaiveDate;
use unicode_normalization::UnicodeNormalization;

use crate::entity::{Gender, RecordKind, Student};
use crate::temporal::age_on;

/// Student table filter. Every field is optional and they combine with AND.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StudentFilter {
    /// Tab the table is showing
    pub kind: Option<RecordKind>,
    pub gender: Option<Gender>,
    /// Case-insensitive substring of the class code
    pub class_code: Option<String>,
    /// Case-insensitive substring of the birth place
    pub birth_place: Option<String>,
    pub is_au_pair: Option<bool>,
    pub pre_registration: Option<bool>,
    pub age_min: Option<i32>,
    pub age_max: Option<i32>,
}

impl StudentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Check one student against the filter; ages are computed on `today`.
    ///
    /// Once an age bound is set, students without a birth date are excluded.
    pub fn matches(&self, student: &Student, today: NaiveDate) -> bool {
        let d = &student.details;

        if let Some(kind) = self.kind {
            if student.record_kind() != kind {
                return false;
            }
        }

        if self.gender.is_some() && d.gender != self.gender {
            return false;
        }

        if !contains_folded(d.class_code.as_deref(), self.class_code.as_deref()) {
            return false;
        }

        if !contains_folded(d.birth_place.as_deref(), self.birth_place.as_deref()) {
            return false;
        }

        if self.is_au_pair.is_some_and(|required| d.is_au_pair != required) {
            return false;
        }

        if self
            .pre_registration
            .is_some_and(|required| d.pre_registration != required)
        {
            return false;
        }

        if self.age_min.is_some() || self.age_max.is_some() {
            let Some(age) = d.birth_date.map(|b| age_on(b, today)) else {
                return false;
            };
            if self.age_min.is_some_and(|min| age < min) {
                return false;
            }
            if self.age_max.is_some_and(|max| age > max) {
                return false;
            }
        }

        true
    }

    pub fn apply<'a>(&self, students: &'a [Student], today: NaiveDate) -> Vec<&'a Student> {
        students.iter().filter(|s| self.matches(s, today)).collect()
    }
}

fn contains_folded(value: Option<&str>, needle: Option<&str>) -> bool {
    let needle = match needle.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_lowercase(),
        _ => return true,
    };
    value.is_some_and(|v| v.to_lowercase().contains(&needle))
}

/// Parse a filter string into a [`StudentFilter`].
///
/// Tokens are `key:value` pairs separated by whitespace:
/// - `kind:enrolled` - tab (lead, pre, enrolled, left)
/// - `gender:F`
/// - `class:b1` / `place:lima` - substring matches
/// - `au-pair:true` / `pre:false`
/// - `age:>20` / `age:<30` - inclusive bounds
///
/// Unknown keys and unparsable values are reported as errors.
pub fn parse_filter(raw: &str) -> Result<StudentFilter, String> {
    let mut filter = StudentFilter::default();

    for token in raw.split_whitespace() {
        let (key, value) = token
            .split_once(':')
            .ok_or_else(|| format!("Expected key:value, got '{}'", token))?;

        match key.to_lowercase().as_str() {
            "kind" | "tab" => filter.kind = Some(value.parse()?),
            "gender" => filter.gender = Some(value.parse()?),
            "class" => filter.class_code = Some(value.to_string()),
            "place" | "birthplace" => filter.birth_place = Some(value.to_string()),
            "au-pair" | "aupair" => filter.is_au_pair = Some(parse_bool(value)?),
            "pre" => filter.pre_registration = Some(parse_bool(value)?),
            "age" => {
                if let Some(min) = value.strip_prefix('>') {
                    filter.age_min = Some(parse_age(min)?);
                } else if let Some(max) = value.strip_prefix('<') {
                    filter.age_max = Some(parse_age(max)?);
                } else {
                    let exact = parse_age(value)?;
                    filter.age_min = Some(exact);
                    filter.age_max = Some(exact);
                }
            }
            _ => return Err(format!("Unknown filter key: {}", key)),
        }
    }

    Ok(filter)
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "oui" => Ok(true),
        "false" | "no" | "non" => Ok(false),
        _ => Err(format!("Invalid boolean: {}", value)),
    }
}

fn parse_age(value: &str) -> Result<i32, String> {
    value
        .parse()
        .map_err(|_| format!("Invalid age: {}", value))
}

/// Only the tab's students, in their original order
pub fn students_in_tab(students: &[Student], kind: RecordKind) -> Vec<&Student> {
    students.iter().filter(|s| s.record_kind() == kind).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    LastName,
    FirstName,
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "last_name" | "last" => Ok(SortKey::LastName),
            "first_name" | "first" => Ok(SortKey::FirstName),
            _ => Err(format!("Invalid sort key: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortState {
    pub fn asc(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Asc,
        }
    }

    /// Header click: same column flips direction, a new column starts ascending
    pub fn toggle(current: Option<SortState>, key: SortKey) -> SortState {
        match current {
            Some(state) if state.key == key => SortState {
                key,
                direction: match state.direction {
                    SortDirection::Asc => SortDirection::Desc,
                    SortDirection::Desc => SortDirection::Asc,
                },
            },
            _ => SortState::asc(key),
        }
    }
}

/// Fold case and accents so "Élodie" sorts next to "elodie"
fn collation_key(value: &str) -> String {
    value
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect::<String>()
        .to_lowercase()
}

/// Stable sort by name; `None` leaves the order untouched
pub fn sort_students(students: &mut [&Student], state: Option<SortState>) {
    let Some(state) = state else {
        return;
    };

    students.sort_by(|a, b| {
        let (left, right) = match state.key {
            SortKey::LastName => (&a.details.last_name, &b.details.last_name),
            SortKey::FirstName => (&a.details.first_name, &b.details.first_name),
        };
        let ord: Ordering = collation_key(left).cmp(&collation_key(right));
        match state.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}
