// src/entity/student.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Record, RecordBase};
use crate::temporal::{DayRange, Scheduled};

/// Registration stage of a student
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordKind {
    #[default]
    Lead,
    PreRegistered,
    Enrolled,
    Left,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Enrolled,
        RecordKind::PreRegistered,
        RecordKind::Lead,
        RecordKind::Left,
    ];

    /// Two-flag derivation with the departed flag applied as an override
    pub fn resolve(pre_registration: bool, paid_total: bool, left: bool) -> Self {
        if left {
            RecordKind::Left
        } else {
            derive_record_kind(pre_registration, paid_total)
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Lead => write!(f, "LEAD"),
            RecordKind::PreRegistered => write!(f, "PRE_REGISTERED"),
            RecordKind::Enrolled => write!(f, "ENROLLED"),
            RecordKind::Left => write!(f, "LEFT"),
        }
    }
}

impl std::str::FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "lead" | "leads" => Ok(RecordKind::Lead),
            "pre_registered" | "preregistered" | "pre" => Ok(RecordKind::PreRegistered),
            "enrolled" => Ok(RecordKind::Enrolled),
            "left" => Ok(RecordKind::Left),
            _ => Err(format!("Invalid record kind: {}", s)),
        }
    }
}

/// Derive the lifecycle stage from the two payment flags.
///
/// `paid_total` wins over `pre_registration`; neither set means `Lead`.
pub fn derive_record_kind(pre_registration: bool, paid_total: bool) -> RecordKind {
    if paid_total {
        RecordKind::Enrolled
    } else if pre_registration {
        RecordKind::PreRegistered
    } else {
        RecordKind::Lead
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    M,
    F,
    X,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::M => write!(f, "M"),
            Gender::F => write!(f, "F"),
            Gender::X => write!(f, "X"),
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "M" => Ok(Gender::M),
            "F" => Ok(Gender::F),
            "X" => Ok(Gender::X),
            _ => Err(format!("Invalid gender: {}", s)),
        }
    }
}

/// Host family contact for au pair students
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuPairDetail {
    pub family_name1: Option<String>,
    pub family_name2: Option<String>,
    pub family_mail: Option<String>,
}

impl AuPairDetail {
    pub fn is_empty(&self) -> bool {
        self.family_name1.is_none() && self.family_name2.is_none() && self.family_mail.is_none()
    }
}

/// Editable fields of a student row.
///
/// The record kind is deliberately absent: it is recomputed from the flags
/// on every read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentDetails {
    pub first_name: String,
    pub last_name: String,
    pub class_code: Option<String>,
    pub note: Option<String>,
    pub gender: Option<Gender>,
    pub arrival_date: Option<NaiveDate>,
    pub departure_date: Option<NaiveDate>,
    pub birth_date: Option<NaiveDate>,
    pub birth_place: Option<String>,
    pub is_au_pair: bool,
    pub pre_registration: bool,
    pub paid_150: bool,
    pub paid_total: bool,
    #[serde(default)]
    pub left: bool,
    pub dossier_number: Option<String>,
    pub au_pair: Option<AuPairDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    #[serde(flatten)]
    pub base: RecordBase,
    #[serde(flatten)]
    pub details: StudentDetails,
}

impl Student {
    pub fn new(details: StudentDetails) -> Self {
        Self {
            base: RecordBase::new(),
            details,
        }
    }

    pub fn record_kind(&self) -> RecordKind {
        RecordKind::resolve(
            self.details.pre_registration,
            self.details.paid_total,
            self.details.left,
        )
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.details.first_name, self.details.last_name)
            .trim()
            .to_string()
    }
}

impl Scheduled for Student {
    /// Stay window; absent without an arrival date or when the dates are inverted
    fn day_range(&self) -> Option<DayRange> {
        let arrival = self.details.arrival_date?;
        DayRange::new(arrival, self.details.departure_date).ok()
    }
}

impl Record for Student {
    const KIND: &'static str = "student";
    type Fields = StudentDetails;

    fn from_parts(base: RecordBase, fields: StudentDetails) -> Self {
        Self {
            base,
            details: fields,
        }
    }

    fn base(&self) -> &RecordBase {
        &self.base
    }

    fn fields(&self) -> &StudentDetails {
        &self.details
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_record_kind_table() {
        assert_eq!(derive_record_kind(true, true), RecordKind::Enrolled);
        assert_eq!(derive_record_kind(true, false), RecordKind::PreRegistered);
        assert_eq!(derive_record_kind(false, false), RecordKind::Lead);
        assert_eq!(derive_record_kind(false, true), RecordKind::Enrolled);
    }

    #[test]
    fn test_left_overrides_flags() {
        assert_eq!(RecordKind::resolve(true, true, true), RecordKind::Left);
        assert_eq!(RecordKind::resolve(false, false, true), RecordKind::Left);
        assert_eq!(RecordKind::resolve(true, false, false), RecordKind::PreRegistered);
    }

    #[test]
    fn test_record_kind_recomputed_from_flags() {
        let mut student = Student::new(StudentDetails {
            first_name: "Ana".to_string(),
            last_name: "Silva".to_string(),
            ..Default::default()
        });
        assert_eq!(student.record_kind(), RecordKind::Lead);

        student.details.pre_registration = true;
        student.details.paid_150 = true;
        assert_eq!(student.record_kind(), RecordKind::PreRegistered);

        student.details.paid_total = true;
        assert_eq!(student.record_kind(), RecordKind::Enrolled);
    }

    #[test]
    fn test_record_kind_parse_and_display() {
        for kind in RecordKind::ALL {
            assert_eq!(kind.to_string().parse::<RecordKind>().unwrap(), kind);
        }
        assert_eq!("pre-registered".parse::<RecordKind>().unwrap(), RecordKind::PreRegistered);
        assert!("alumni".parse::<RecordKind>().is_err());
    }

    #[test]
    fn test_record_kind_serializes_screaming_case() {
        let json = serde_json::to_string(&RecordKind::PreRegistered).unwrap();
        assert_eq!(json, "\"PRE_REGISTERED\"");
    }

    #[test]
    fn test_gender_parse() {
        assert_eq!(" f ".parse::<Gender>().unwrap(), Gender::F);
        assert!("Q".parse::<Gender>().is_err());
    }

    #[test]
    fn test_stay_range_collapses_without_departure() {
        let student = Student::new(StudentDetails {
            arrival_date: NaiveDate::from_ymd_opt(2024, 9, 2),
            ..Default::default()
        });
        let range = student.day_range().unwrap();
        assert_eq!(range.start(), range.end());
    }

    #[test]
    fn test_full_name() {
        let student = Student::new(StudentDetails {
            first_name: "Ana".to_string(),
            last_name: "Silva".to_string(),
            ..Default::default()
        });
        assert_eq!(student.full_name(), "Ana Silva");
    }
}
