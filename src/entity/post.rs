// src/entity/post.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Record, RecordBase};
use crate::temporal::{day_of, DayRange, Scheduled};

/// Underlying event type of a calendar post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostType {
    #[default]
    Info,
    Absence,
    Event,
    Remplacement,
    Retard,
}

impl std::fmt::Display for PostType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostType::Info => write!(f, "INFO"),
            PostType::Absence => write!(f, "ABSENCE"),
            PostType::Event => write!(f, "EVENT"),
            PostType::Remplacement => write!(f, "REMPLACEMENT"),
            PostType::Retard => write!(f, "RETARD"),
        }
    }
}

impl std::str::FromStr for PostType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(PostType::Info),
            "absence" => Ok(PostType::Absence),
            "event" => Ok(PostType::Event),
            "remplacement" => Ok(PostType::Remplacement),
            "retard" => Ok(PostType::Retard),
            _ => Err(format!("Invalid post type: {}", s)),
        }
    }
}

/// What the calendar shows: "featured" overrides the underlying type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostCategory {
    #[serde(rename = "A_LA_UNE")]
    Featured,
    Info,
    Absence,
    Event,
    Remplacement,
    Retard,
}

impl PostCategory {
    pub const ALL: [PostCategory; 6] = [
        PostCategory::Featured,
        PostCategory::Info,
        PostCategory::Absence,
        PostCategory::Event,
        PostCategory::Remplacement,
        PostCategory::Retard,
    ];

    pub fn index(self) -> usize {
        match self {
            PostCategory::Featured => 0,
            PostCategory::Info => 1,
            PostCategory::Absence => 2,
            PostCategory::Event => 3,
            PostCategory::Remplacement => 4,
            PostCategory::Retard => 5,
        }
    }
}

impl From<PostType> for PostCategory {
    fn from(post_type: PostType) -> Self {
        match post_type {
            PostType::Info => PostCategory::Info,
            PostType::Absence => PostCategory::Absence,
            PostType::Event => PostCategory::Event,
            PostType::Remplacement => PostCategory::Remplacement,
            PostType::Retard => PostCategory::Retard,
        }
    }
}

impl std::fmt::Display for PostCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostCategory::Featured => write!(f, "A_LA_UNE"),
            PostCategory::Info => write!(f, "INFO"),
            PostCategory::Absence => write!(f, "ABSENCE"),
            PostCategory::Event => write!(f, "EVENT"),
            PostCategory::Remplacement => write!(f, "REMPLACEMENT"),
            PostCategory::Retard => write!(f, "RETARD"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDetails {
    pub title: String,
    pub description: Option<String>,
    pub author_name: String,
    pub post_type: PostType,
    #[serde(default)]
    pub featured: bool,
    pub start_at: DateTime<Utc>,
    /// Absent means a single-day post
    pub end_at: Option<DateTime<Utc>>,
}

impl PostDetails {
    pub fn new(title: String, author_name: String, start_at: DateTime<Utc>) -> Self {
        Self {
            title,
            description: None,
            author_name,
            post_type: PostType::default(),
            featured: false,
            start_at,
            end_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    #[serde(flatten)]
    pub base: RecordBase,
    #[serde(flatten)]
    pub details: PostDetails,
}

impl Post {
    pub fn new(details: PostDetails) -> Self {
        Self {
            base: RecordBase::new(),
            details,
        }
    }

    pub fn category(&self) -> PostCategory {
        if self.details.featured {
            PostCategory::Featured
        } else {
            self.details.post_type.into()
        }
    }
}

impl Scheduled for Post {
    fn day_range(&self) -> Option<DayRange> {
        let start = day_of(&self.details.start_at);
        DayRange::new(start, self.details.end_at.as_ref().map(day_of)).ok()
    }
}

impl Record for Post {
    const KIND: &'static str = "post";
    type Fields = PostDetails;

    fn from_parts(base: RecordBase, fields: PostDetails) -> Self {
        Self {
            base,
            details: fields,
        }
    }

    fn base(&self) -> &RecordBase {
        &self.base
    }

    fn fields(&self) -> &PostDetails {
        &self.details
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn post(post_type: PostType, featured: bool) -> Post {
        let start = Utc.with_ymd_and_hms(2024, 3, 4, 9, 30, 0).unwrap();
        let mut details = PostDetails::new("Réunion".to_string(), "Claire".to_string(), start);
        details.post_type = post_type;
        details.featured = featured;
        Post::new(details)
    }

    #[test]
    fn test_featured_overrides_underlying_type() {
        let p = post(PostType::Event, true);
        assert_eq!(p.category(), PostCategory::Featured);
        assert_eq!(p.details.post_type, PostType::Event);
    }

    #[test]
    fn test_category_follows_type_when_not_featured() {
        assert_eq!(post(PostType::Retard, false).category(), PostCategory::Retard);
    }

    #[test]
    fn test_featured_serializes_as_a_la_une() {
        let json = serde_json::to_string(&PostCategory::Featured).unwrap();
        assert_eq!(json, "\"A_LA_UNE\"");
    }

    #[test]
    fn test_single_day_range_truncates_time() {
        let p = post(PostType::Info, false);
        let range = p.day_range().unwrap();
        assert_eq!(range.start(), range.end());
        assert_eq!(range.start().to_string(), "2024-03-04");
    }

    #[test]
    fn test_category_index_matches_all_order() {
        for (i, category) in PostCategory::ALL.iter().enumerate() {
            assert_eq!(category.index(), i);
        }
    }
}
