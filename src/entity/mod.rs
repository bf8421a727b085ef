mod post;
mod profile;
mod season;
mod student;

pub use post::{Post, PostCategory, PostDetails, PostType};
pub use profile::{require_role, ProfileDetails, Role, UserAction, UserProfile};
pub use season::{select_season, Season, SeasonDetails};
pub use student::{derive_record_kind, AuPairDetail, Gender, RecordKind, Student, StudentDetails};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity fields assigned by the record store at creation and never mutated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordBase {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl RecordBase {
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Fresh identity with an explicit creation time
    pub fn at(created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at,
        }
    }
}

impl Default for RecordBase {
    fn default() -> Self {
        Self::new()
    }
}

/// A persisted row: store-owned identity plus the user-editable fields.
///
/// `Fields` is the create/update payload. The store never lets a payload
/// touch `RecordBase`.
pub trait Record: Sized {
    /// Discriminator used by the store to keep record families apart
    const KIND: &'static str;

    type Fields: Serialize + DeserializeOwned + Clone;

    fn from_parts(base: RecordBase, fields: Self::Fields) -> Self;
    fn base(&self) -> &RecordBase;
    fn fields(&self) -> &Self::Fields;

    fn id(&self) -> &Uuid {
        &self.base().id
    }

    fn created_at(&self) -> &DateTime<Utc> {
        &self.base().created_at
    }
}

/// Trim a free-text field, mapping blank input to `None`
pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
