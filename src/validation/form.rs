// src/validation/form.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entity::{
    derive_record_kind, non_blank, AuPairDetail, Gender, RecordKind, Student, StudentDetails,
};

/// The two flags that must always agree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositFlag {
    PreRegistration,
    Paid150,
}

/// Editing either flag moves both: returns `(pre_registration, paid_150)`.
pub fn sync_deposit_flags(_edited: DepositFlag, value: bool) -> (bool, bool) {
    (value, value)
}

/// Student create/edit form as typed in by the user, before trimming.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentForm {
    pub first_name: String,
    pub last_name: String,
    pub class_code: String,
    pub note: String,
    pub gender: Option<Gender>,
    pub arrival_date: Option<NaiveDate>,
    pub departure_date: Option<NaiveDate>,
    pub birth_date: Option<NaiveDate>,
    pub birth_place: String,
    pub is_au_pair: bool,
    pub pre_registration: bool,
    pub paid_150: bool,
    pub paid_total: bool,
    pub left: bool,
    pub dossier_number: String,
    pub family_name1: String,
    pub family_name2: String,
    pub family_mail: String,
}

impl StudentForm {
    /// Prefill the edit form from a stored student
    pub fn from_student(student: &Student) -> Self {
        let d = &student.details;
        let au_pair = d.au_pair.clone().unwrap_or_default();
        Self {
            first_name: d.first_name.clone(),
            last_name: d.last_name.clone(),
            class_code: d.class_code.clone().unwrap_or_default(),
            note: d.note.clone().unwrap_or_default(),
            gender: d.gender,
            arrival_date: d.arrival_date,
            departure_date: d.departure_date,
            birth_date: d.birth_date,
            birth_place: d.birth_place.clone().unwrap_or_default(),
            is_au_pair: d.is_au_pair,
            pre_registration: d.pre_registration,
            paid_150: d.paid_150,
            paid_total: d.paid_total,
            left: d.left,
            dossier_number: d.dossier_number.clone().unwrap_or_default(),
            family_name1: au_pair.family_name1.unwrap_or_default(),
            family_name2: au_pair.family_name2.unwrap_or_default(),
            family_mail: au_pair.family_mail.unwrap_or_default(),
        }
    }

    /// Set one deposit flag, keeping its partner in sync
    pub fn set_deposit_flag(&mut self, flag: DepositFlag, value: bool) {
        let (pre_registration, paid_150) = sync_deposit_flags(flag, value);
        self.pre_registration = pre_registration;
        self.paid_150 = paid_150;
    }

    /// Kind the student would get if saved now, ignoring the departed flag
    pub fn derived_kind(&self) -> RecordKind {
        derive_record_kind(self.pre_registration, self.paid_total)
    }

    /// Trimmed payload for the store; blank text becomes `None`.
    ///
    /// Host family details are kept only for au pairs.
    pub fn to_details(&self) -> StudentDetails {
        let au_pair = if self.is_au_pair {
            let detail = AuPairDetail {
                family_name1: non_blank(&self.family_name1),
                family_name2: non_blank(&self.family_name2),
                family_mail: non_blank(&self.family_mail),
            };
            (!detail.is_empty()).then_some(detail)
        } else {
            None
        };

        StudentDetails {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            class_code: non_blank(&self.class_code),
            note: non_blank(&self.note),
            gender: self.gender,
            arrival_date: self.arrival_date,
            departure_date: self.departure_date,
            birth_date: self.birth_date,
            birth_place: non_blank(&self.birth_place),
            is_au_pair: self.is_au_pair,
            pre_registration: self.pre_registration,
            paid_150: self.paid_150,
            paid_total: self.paid_total,
            left: self.left,
            dossier_number: non_blank(&self.dossier_number),
            au_pair,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;

    #[test]
    fn test_setting_either_flag_moves_both() {
        let mut form = StudentForm::default();
        form.set_deposit_flag(DepositFlag::Paid150, true);
        assert!(form.pre_registration && form.paid_150);

        form.set_deposit_flag(DepositFlag::PreRegistration, false);
        assert!(!form.pre_registration && !form.paid_150);
    }

    #[test]
    fn test_synced_flags_never_trip_deposit_rules() {
        for flag in [DepositFlag::PreRegistration, DepositFlag::Paid150] {
            for value in [true, false] {
                let mut form = StudentForm {
                    dossier_number: "D-1".to_string(),
                    ..Default::default()
                };
                form.set_deposit_flag(flag, value);
                assert!(validate(&form).is_empty());
            }
        }
    }

    #[test]
    fn test_to_details_trims_and_drops_blank() {
        let form = StudentForm {
            first_name: "  Ana ".to_string(),
            last_name: "Silva".to_string(),
            class_code: "  ".to_string(),
            dossier_number: " D-9 ".to_string(),
            family_name1: "Martin".to_string(),
            ..Default::default()
        };
        let details = form.to_details();
        assert_eq!(details.first_name, "Ana");
        assert_eq!(details.class_code, None);
        assert_eq!(details.dossier_number, Some("D-9".to_string()));
        // not an au pair: family data is dropped
        assert_eq!(details.au_pair, None);
    }

    #[test]
    fn test_round_trip_through_student() {
        let form = StudentForm {
            first_name: "Ana".to_string(),
            last_name: "Silva".to_string(),
            is_au_pair: true,
            family_name1: "Martin".to_string(),
            pre_registration: true,
            paid_150: true,
            dossier_number: "D-9".to_string(),
            ..Default::default()
        };
        let student = Student::new(form.to_details());
        assert_eq!(StudentForm::from_student(&student), form);
        assert_eq!(form.derived_kind(), RecordKind::PreRegistered);
    }
}
