// src/entity/season.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Record, RecordBase};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonDetails {
    pub code: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_current: bool,
}

/// An FLCE teaching season (e.g. "2024-2025")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Season {
    #[serde(flatten)]
    pub base: RecordBase,
    #[serde(flatten)]
    pub details: SeasonDetails,
}

impl Season {
    pub fn new(details: SeasonDetails) -> Self {
        Self {
            base: RecordBase::new(),
            details,
        }
    }
}

impl Record for Season {
    const KIND: &'static str = "season";
    type Fields = SeasonDetails;

    fn from_parts(base: RecordBase, fields: SeasonDetails) -> Self {
        Self {
            base,
            details: fields,
        }
    }

    fn base(&self) -> &RecordBase {
        &self.base
    }

    fn fields(&self) -> &SeasonDetails {
        &self.details
    }
}

/// Pick the season to display.
///
/// The remembered id wins while it still exists, then the season flagged as
/// current, then the first one listed.
pub fn select_season(seasons: &[Season], remembered: Option<&Uuid>) -> Option<Uuid> {
    if let Some(id) = remembered {
        if seasons.iter().any(|s| &s.base.id == id) {
            return Some(*id);
        }
    }

    seasons
        .iter()
        .find(|s| s.details.is_current)
        .or_else(|| seasons.first())
        .map(|s| s.base.id)
}
