// src/query/posts.rs
//! Posts page and archive filter modes

use chrono::NaiveDate;

use crate::entity::{Post, PostCategory};
use crate::temporal::{add_days, day_of, parse_day, Scheduled};

/// Filter modes of the posts page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostFilter {
    #[default]
    All,
    /// Starts today
    Today,
    /// Created yesterday or later
    SinceYesterday,
    /// Created within the last seven days
    SinceWeek,
    /// Active on the given day
    OnDate(NaiveDate),
}

impl PostFilter {
    pub fn matches(&self, post: &Post, today: NaiveDate) -> bool {
        match self {
            PostFilter::All => true,
            PostFilter::Today => day_of(&post.details.start_at) == today,
            PostFilter::SinceYesterday => day_of(&post.base.created_at) >= add_days(today, -1),
            PostFilter::SinceWeek => day_of(&post.base.created_at) >= add_days(today, -7),
            PostFilter::OnDate(day) => post.day_range().is_some_and(|r| r.is_active_on(*day)),
        }
    }
}

impl std::str::FromStr for PostFilter {
    type Err = String;

    /// `all`, `today`, `since-yesterday`, `since-week` or a `YYYY-MM-DD` day
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "all" => Ok(PostFilter::All),
            "today" => Ok(PostFilter::Today),
            "since_yesterday" | "yesterday" => Ok(PostFilter::SinceYesterday),
            "since_week" | "week" => Ok(PostFilter::SinceWeek),
            _ => parse_day(s)
                .map(PostFilter::OnDate)
                .map_err(|_| format!("Invalid post filter: {}", s)),
        }
    }
}

/// Filter modes of the "my posts" archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArchiveFilter {
    #[default]
    All,
    /// Ended before today
    Past,
    /// Starts after today
    Scheduled,
    /// Active on the day, or everything when no day is picked
    Date(Option<NaiveDate>),
}

impl ArchiveFilter {
    pub fn matches(&self, post: &Post, today: NaiveDate) -> bool {
        let Some(range) = post.day_range() else {
            return matches!(self, ArchiveFilter::All | ArchiveFilter::Date(None));
        };
        match self {
            ArchiveFilter::All | ArchiveFilter::Date(None) => true,
            ArchiveFilter::Past => range.is_past(today),
            ArchiveFilter::Scheduled => range.is_upcoming(today),
            ArchiveFilter::Date(Some(day)) => range.is_active_on(*day),
        }
    }
}

impl std::str::FromStr for ArchiveFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(ArchiveFilter::All),
            "past" => Ok(ArchiveFilter::Past),
            "scheduled" => Ok(ArchiveFilter::Scheduled),
            "date" => Ok(ArchiveFilter::Date(None)),
            _ => parse_day(s)
                .map(|day| ArchiveFilter::Date(Some(day)))
                .map_err(|_| format!("Invalid archive filter: {}", s)),
        }
    }
}

/// Newest first; equal timestamps keep their input order
pub fn sort_by_created_desc(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.base.created_at.cmp(&a.base.created_at));
}

pub fn filter_posts<'a>(posts: &'a [Post], filter: PostFilter, today: NaiveDate) -> Vec<&'a Post> {
    posts.iter().filter(|p| filter.matches(p, today)).collect()
}

pub fn filter_archive<'a>(
    posts: &'a [Post],
    filter: ArchiveFilter,
    today: NaiveDate,
) -> Vec<&'a Post> {
    posts.iter().filter(|p| filter.matches(p, today)).collect()
}

/// Featured posts running today, for the sidebar
pub fn featured_today(posts: &[Post], today: NaiveDate) -> Vec<&Post> {
    posts
        .iter()
        .filter(|p| p.category() == PostCategory::Featured)
        .filter(|p| p.day_range().is_some_and(|r| r.is_active_on(today)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{PostDetails, RecordBase};
    use chrono::{TimeZone, Utc};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn post(title: &str, start: NaiveDate, end: Option<NaiveDate>, created: NaiveDate) -> Post {
        let at = |day: NaiveDate| Utc.from_utc_datetime(&day.and_hms_opt(9, 30, 0).unwrap());
        let mut details = PostDetails::new(title.to_string(), "Claire".to_string(), at(start));
        details.end_at = end.map(at);
        Post {
            base: RecordBase::at(at(created)),
            details,
        }
    }

    fn titles(posts: &[&Post]) -> Vec<String> {
        posts.iter().map(|p| p.details.title.clone()).collect()
    }

    fn sample() -> Vec<Post> {
        vec![
            post("today", d(2024, 1, 10), None, d(2024, 1, 2)),
            post("yesterday", d(2024, 1, 8), Some(d(2024, 1, 9)), d(2024, 1, 9)),
            post("week", d(2024, 1, 20), None, d(2024, 1, 3)),
            post("old", d(2023, 12, 1), Some(d(2023, 12, 31)), d(2023, 11, 20)),
        ]
    }

    #[test]
    fn test_post_filter_modes() {
        let posts = sample();
        let today = d(2024, 1, 10);

        assert_eq!(filter_posts(&posts, PostFilter::All, today).len(), 4);
        assert_eq!(titles(&filter_posts(&posts, PostFilter::Today, today)), vec!["today"]);
        assert_eq!(
            titles(&filter_posts(&posts, PostFilter::SinceYesterday, today)),
            vec!["yesterday"]
        );
        assert_eq!(
            titles(&filter_posts(&posts, PostFilter::SinceWeek, today)),
            vec!["yesterday", "week"]
        );
        assert_eq!(
            titles(&filter_posts(&posts, PostFilter::OnDate(d(2023, 12, 15)), today)),
            vec!["old"]
        );
    }

    #[test]
    fn test_archive_filter_modes() {
        let posts = sample();
        let today = d(2024, 1, 10);

        assert_eq!(
            titles(&filter_archive(&posts, ArchiveFilter::Past, today)),
            vec!["yesterday", "old"]
        );
        assert_eq!(
            titles(&filter_archive(&posts, ArchiveFilter::Scheduled, today)),
            vec!["week"]
        );
        assert_eq!(filter_archive(&posts, ArchiveFilter::Date(None), today).len(), 4);
        assert_eq!(
            titles(&filter_archive(&posts, ArchiveFilter::Date(Some(d(2024, 1, 9))), today)),
            vec!["yesterday"]
        );
    }

    #[test]
    fn test_parse_filters() {
        assert_eq!("since-week".parse::<PostFilter>().unwrap(), PostFilter::SinceWeek);
        assert_eq!(
            "2024-01-10".parse::<PostFilter>().unwrap(),
            PostFilter::OnDate(d(2024, 1, 10))
        );
        assert!("tomorrow".parse::<PostFilter>().is_err());
        assert_eq!("scheduled".parse::<ArchiveFilter>().unwrap(), ArchiveFilter::Scheduled);
        assert_eq!(
            "2024-01-10".parse::<ArchiveFilter>().unwrap(),
            ArchiveFilter::Date(Some(d(2024, 1, 10)))
        );
    }

    #[test]
    fn test_sort_by_created_desc() {
        let mut posts = sample();
        sort_by_created_desc(&mut posts);
        let order: Vec<_> = posts.iter().map(|p| p.details.title.as_str()).collect();
        assert_eq!(order, vec!["yesterday", "week", "today", "old"]);
    }

    #[test]
    fn test_featured_today() {
        let mut posts = sample();
        posts[0].details.featured = true;
        posts[3].details.featured = true;
        let featured = featured_today(&posts, d(2024, 1, 10));
        assert_eq!(titles(&featured), vec!["today"]);
    }
}
