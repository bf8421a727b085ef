//! Save-readiness checks for student, post and season forms.
//!
//! Validation never fails with an error: it returns the list of problems
//! (empty when the form can be saved). The caller must not persist while the
//! list is non-empty.

mod form;

pub use form::{sync_deposit_flags, DepositFlag, StudentForm};

use std::future::Future;

use uuid::Uuid;

use crate::entity::{derive_record_kind, PostDetails, RecordKind, Season};
use crate::error::Result;
use crate::temporal::day_of;

/// A single reason a form cannot be saved yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// Pre-registered and enrolled students need a dossier number.
    DossierRequired,
    /// Another student already uses this dossier number.
    DossierTaken { dossier_number: String },
    /// The 150 deposit is ticked while pre-registration is not.
    DepositWithoutPreRegistration,
    /// Pre-registration is ticked but the 150 deposit is not.
    PreRegistrationWithoutDeposit,
    DepartureBeforeArrival,
    PostTitleRequired,
    PostEndBeforeStart,
    SeasonCodeRequired,
    SeasonCodeTaken { code: String },
    SeasonStartAfterEnd,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationIssue::DossierRequired => write!(
                f,
                "dossier number required for pre-registered and enrolled students"
            ),
            ValidationIssue::DossierTaken { dossier_number } => {
                write!(f, "dossier number {} is already taken", dossier_number)
            }
            ValidationIssue::DepositWithoutPreRegistration => {
                write!(f, "paid150 cannot be true when preRegistration is false")
            }
            ValidationIssue::PreRegistrationWithoutDeposit => {
                write!(f, "paid150 must be true when preRegistration is true")
            }
            ValidationIssue::DepartureBeforeArrival => {
                write!(f, "departure date must not be before arrival date")
            }
            ValidationIssue::PostTitleRequired => write!(f, "post title is required"),
            ValidationIssue::PostEndBeforeStart => {
                write!(f, "post end date must not be before its start date")
            }
            ValidationIssue::SeasonCodeRequired => write!(f, "season code is required"),
            ValidationIssue::SeasonCodeTaken { code } => {
                write!(f, "season code {} already exists", code)
            }
            ValidationIssue::SeasonStartAfterEnd => {
                write!(f, "season start date must be before its end date")
            }
        }
    }
}

/// Collect every rule violation of a student form (no short-circuit).
pub fn validate_issues(form: &StudentForm) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let kind = derive_record_kind(form.pre_registration, form.paid_total);
    if kind != RecordKind::Lead && form.dossier_number.trim().is_empty() {
        issues.push(ValidationIssue::DossierRequired);
    }

    if !form.pre_registration && form.paid_150 {
        issues.push(ValidationIssue::DepositWithoutPreRegistration);
    }

    if form.pre_registration && !form.paid_150 {
        issues.push(ValidationIssue::PreRegistrationWithoutDeposit);
    }

    if let (Some(arrival), Some(departure)) = (form.arrival_date, form.departure_date) {
        if departure < arrival {
            issues.push(ValidationIssue::DepartureBeforeArrival);
        }
    }

    issues
}

/// Human-readable validation messages for a student form.
pub fn validate(form: &StudentForm) -> Vec<String> {
    validate_issues(form).iter().map(|i| i.to_string()).collect()
}

/// Ask the store whether the form's dossier number is used by another student.
///
/// `is_taken` receives the trimmed number and the id of the student being
/// edited (to exclude it). A blank number is never checked.
pub async fn check_dossier_unique<F, Fut>(
    form: &StudentForm,
    exclude_id: Option<Uuid>,
    is_taken: F,
) -> Result<Option<ValidationIssue>>
where
    F: FnOnce(String, Option<Uuid>) -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let dossier_number = form.dossier_number.trim();
    if dossier_number.is_empty() {
        return Ok(None);
    }

    if is_taken(dossier_number.to_string(), exclude_id).await? {
        Ok(Some(ValidationIssue::DossierTaken {
            dossier_number: dossier_number.to_string(),
        }))
    } else {
        Ok(None)
    }
}

/// Full pre-save check: the pure rules, then the uniqueness round trip.
///
/// Store failures propagate as errors; rule violations come back as messages.
pub async fn validate_for_save<F, Fut>(
    form: &StudentForm,
    exclude_id: Option<Uuid>,
    is_taken: F,
) -> Result<Vec<String>>
where
    F: FnOnce(String, Option<Uuid>) -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let mut messages = validate(form);
    if let Some(issue) = check_dossier_unique(form, exclude_id, is_taken).await? {
        messages.push(issue.to_string());
    }
    Ok(messages)
}

pub fn validate_post(details: &PostDetails) -> Vec<String> {
    let mut messages = Vec::new();

    if details.title.trim().is_empty() {
        messages.push(ValidationIssue::PostTitleRequired.to_string());
    }

    if let Some(end) = &details.end_at {
        if day_of(end) < day_of(&details.start_at) {
            messages.push(ValidationIssue::PostEndBeforeStart.to_string());
        }
    }

    messages
}

/// First failing season rule, if any.
///
/// Codes are compared trimmed and case-insensitively, skipping the season
/// currently being edited.
pub fn validate_season(
    code: &str,
    start_date: Option<chrono::NaiveDate>,
    end_date: Option<chrono::NaiveDate>,
    seasons: &[Season],
    editing_id: Option<&Uuid>,
) -> Option<ValidationIssue> {
    let code = code.trim();
    if code.is_empty() {
        return Some(ValidationIssue::SeasonCodeRequired);
    }

    let normalized = code.to_lowercase();
    let duplicate = seasons.iter().any(|season| {
        season.details.code.trim().to_lowercase() == normalized
            && Some(&season.base.id) != editing_id
    });
    if duplicate {
        return Some(ValidationIssue::SeasonCodeTaken {
            code: code.to_string(),
        });
    }

    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start > end {
            return Some(ValidationIssue::SeasonStartAfterEnd);
        }
    }

    None
}
