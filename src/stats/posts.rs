// src/stats/posts.rs
//! Accueil calendar statistics

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use super::{GroupCount, GroupCounts, MonthlyBuckets, TimingCounts};
use crate::config::ClefConfig;
use crate::entity::{Post, PostCategory};
use crate::temporal::{add_days, day_of, week_window, Scheduled};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: PostCategory,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostPreview {
    pub id: Uuid,
    pub title: String,
    pub start: NaiveDate,
}

impl From<&Post> for PostPreview {
    fn from(post: &Post) -> Self {
        Self {
            id: post.base.id,
            title: post.details.title.clone(),
            start: day_of(&post.details.start_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostStats {
    pub today: NaiveDate,
    pub total: usize,
    #[serde(flatten)]
    pub timing: TimingCounts,
    /// Created within the last seven days, today included
    pub last_7_days: usize,
    pub categories: Vec<CategoryCount>,
    pub top_authors: Vec<GroupCount>,
    pub author_breakdown: Vec<GroupCount>,
    /// Creation month histogram for the year of `today`
    pub monthly: MonthlyBuckets,
    pub last_published: Option<PostPreview>,
    pub next_upcoming: Vec<PostPreview>,
}

impl PostStats {
    pub fn compute(posts: &[Post], today: NaiveDate, config: &ClefConfig) -> Self {
        let week = week_window(today);
        let seven_days_ago = add_days(today, -7);

        let mut timing = TimingCounts::default();
        let mut last_7_days = 0;
        let mut categories = [0usize; 6];
        let mut authors = GroupCounts::new();
        let mut monthly = MonthlyBuckets::new(today.year());
        let mut last_published: Option<&Post> = None;
        let mut upcoming: Vec<&Post> = Vec::new();

        for post in posts {
            let created = day_of(&post.base.created_at);

            if let Some(range) = post.day_range() {
                timing.record(&range, today, &week);
                if range.start() >= today {
                    upcoming.push(post);
                }
            }

            if created >= seven_days_ago {
                last_7_days += 1;
            }

            categories[post.category().index()] += 1;
            authors.add(post.details.author_name.as_str());
            monthly.add(created);

            if last_published.map_or(true, |p| post.base.created_at > p.base.created_at) {
                last_published = Some(post);
            }
        }

        upcoming.sort_by_key(|p| p.details.start_at);
        let next_upcoming = upcoming
            .into_iter()
            .take(config.upcoming_preview)
            .map(PostPreview::from)
            .collect();

        Self {
            today,
            total: posts.len(),
            timing,
            last_7_days,
            categories: PostCategory::ALL
                .iter()
                .map(|&category| CategoryCount {
                    category,
                    count: categories[category.index()],
                })
                .collect(),
            top_authors: authors.top(config.top_authors),
            author_breakdown: authors.ranked(),
            monthly,
            last_published: last_published.map(PostPreview::from),
            next_upcoming,
        }
    }

    pub fn category_count(&self, category: PostCategory) -> usize {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.count)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{PostDetails, PostType, RecordBase};
    use chrono::{TimeZone, Utc};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn post(
        title: &str,
        author: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
        created: NaiveDate,
    ) -> Post {
        let at = |day: NaiveDate| Utc.from_utc_datetime(&day.and_hms_opt(10, 0, 0).unwrap());
        let mut details = PostDetails::new(title.to_string(), author.to_string(), at(start));
        details.end_at = end.map(at);
        Post {
            base: RecordBase::at(at(created)),
            details,
        }
    }

    fn sample() -> Vec<Post> {
        vec![
            post("Rentrée", "Claire", d(2024, 1, 10), None, d(2024, 1, 10)),
            post("Vacances", "Marc", d(2024, 2, 1), Some(d(2024, 2, 5)), d(2024, 2, 1)),
            post("Concert", "Claire", d(2024, 1, 12), None, d(2024, 1, 5)),
            post("Ancien", "Lina", d(2023, 11, 3), None, d(2023, 11, 1)),
        ]
    }

    #[test]
    fn test_scalar_counts() {
        let stats = PostStats::compute(&sample(), d(2024, 1, 10), &ClefConfig::default());
        assert_eq!(stats.total, 4);
        assert_eq!(stats.timing.active_today, 1);
        assert_eq!(stats.timing.upcoming, 2);
        assert_eq!(stats.timing.past, 1);
        // Rentrée (Wed) and Concert (Fri) fall in the week of 2024-01-08
        assert_eq!(stats.timing.this_week, 2);
        // creation dates on or after 2024-01-03, future ones included
        assert_eq!(stats.last_7_days, 3);
    }

    #[test]
    fn test_category_counts_conserve_total() {
        let mut posts = sample();
        posts[1].details.featured = true;
        posts[2].details.post_type = PostType::Event;
        let stats = PostStats::compute(&posts, d(2024, 1, 10), &ClefConfig::default());

        let sum: usize = stats.categories.iter().map(|c| c.count).sum();
        assert_eq!(sum, stats.total);
        assert_eq!(stats.category_count(PostCategory::Featured), 1);
        assert_eq!(stats.category_count(PostCategory::Event), 1);
        assert_eq!(stats.category_count(PostCategory::Info), 2);
    }

    #[test]
    fn test_authors_ranked() {
        let stats = PostStats::compute(&sample(), d(2024, 1, 10), &ClefConfig::default());
        assert_eq!(stats.top_authors[0].label, "Claire");
        assert_eq!(stats.top_authors[0].count, 2);
        // tie between Marc and Lina keeps first-seen order
        assert_eq!(stats.author_breakdown[1].label, "Marc");
        assert_eq!(stats.author_breakdown[2].label, "Lina");
    }

    #[test]
    fn test_monthly_buckets_current_year_only() {
        let stats = PostStats::compute(&sample(), d(2024, 1, 10), &ClefConfig::default());
        assert_eq!(stats.monthly.year, 2024);
        assert_eq!(stats.monthly.counts[0], 2);
        assert_eq!(stats.monthly.counts[1], 1);
        assert_eq!(stats.monthly.total(), 3);
    }

    #[test]
    fn test_last_published_and_next_upcoming() {
        let stats = PostStats::compute(&sample(), d(2024, 1, 10), &ClefConfig::default());
        assert_eq!(stats.last_published.unwrap().title, "Vacances");

        let titles: Vec<_> = stats.next_upcoming.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Rentrée", "Concert", "Vacances"]);
    }

    #[test]
    fn test_preview_limit_from_config() {
        let config = ClefConfig {
            upcoming_preview: 1,
            top_authors: 1,
            ..Default::default()
        };
        let stats = PostStats::compute(&sample(), d(2024, 1, 10), &config);
        assert_eq!(stats.next_upcoming.len(), 1);
        assert_eq!(stats.top_authors.len(), 1);
    }

    #[test]
    fn test_empty_snapshot() {
        let stats = PostStats::compute(&[], d(2024, 1, 10), &ClefConfig::default());
        assert_eq!(stats.total, 0);
        assert!(stats.last_published.is_none());
        assert!(stats.top_authors.is_empty());
    }
}
