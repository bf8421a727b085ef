mod sqlite_store;

pub use sqlite_store::{SqliteStore, CLEF_DIR};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::entity::Record;
use crate::error::Result;

/// Bounds for a `list` call. Results always come back newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// Only records created at or after this instant
    pub created_after: Option<DateTime<Utc>>,
    /// Only records created strictly before this instant
    pub created_before: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl ListFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn created_after(mut self, at: DateTime<Utc>) -> Self {
        self.created_after = Some(at);
        self
    }

    pub fn created_before(mut self, at: DateTime<Utc>) -> Self {
        self.created_before = Some(at);
        self
    }
}

/// Persistence capability for every record family.
///
/// Implementations own identity: `create` assigns the id and creation
/// time, `update` replaces the editable fields only.
pub trait RecordStore {
    fn list<R: Record>(&self, filter: &ListFilter) -> Result<Vec<R>>;
    fn get<R: Record>(&self, id: &Uuid) -> Result<Option<R>>;
    fn create<R: Record>(&self, fields: &R::Fields) -> Result<R>;
    fn update<R: Record>(&self, id: &Uuid, fields: &R::Fields) -> Result<R>;
    fn delete<R: Record>(&self, id: &Uuid) -> Result<()>;

    /// Whether another record of the family already holds `value` in `field`.
    /// Values are compared trimmed; `exclude_id` skips the record being edited.
    fn is_value_taken<R: Record>(
        &self,
        field: &str,
        value: &str,
        exclude_id: Option<&Uuid>,
    ) -> Result<bool>;
}
