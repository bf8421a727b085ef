// src/report/accueil.rs
//! Accueil dashboard report

use chrono::NaiveDate;
use serde::Serialize;

use crate::stats::{PostPreview, PostStats};
use crate::Result;

use super::{count_table, group_table, yaml_frontmatter};

#[derive(Serialize)]
struct AccueilFrontmatter {
    view: &'static str,
    today: NaiveDate,
    total: usize,
    active_today: usize,
    upcoming: usize,
}

fn preview_line(preview: &PostPreview) -> String {
    format!("- {} ({})\n", preview.title, preview.start.format("%Y-%m-%d"))
}

pub fn render_accueil(stats: &PostStats) -> Result<String> {
    let mut out = yaml_frontmatter(&AccueilFrontmatter {
        view: "accueil",
        today: stats.today,
        total: stats.total,
        active_today: stats.timing.active_today,
        upcoming: stats.timing.upcoming,
    })?;

    out.push_str("\n# Accueil statistics\n\n");
    count_table(
        &mut out,
        ("Metric", "Count"),
        [
            ("Total posts", stats.total.to_string()),
            ("Active today", stats.timing.active_today.to_string()),
            ("Upcoming", stats.timing.upcoming.to_string()),
            ("Past", stats.timing.past.to_string()),
            ("This week", stats.timing.this_week.to_string()),
            ("Created in the last 7 days", stats.last_7_days.to_string()),
        ],
    );

    out.push_str("\n## Categories\n\n");
    let labels: Vec<String> = stats.categories.iter().map(|c| c.category.to_string()).collect();
    count_table(
        &mut out,
        ("Category", "Count"),
        labels
            .iter()
            .zip(&stats.categories)
            .map(|(label, c)| (label.as_str(), c.count.to_string())),
    );

    group_table(&mut out, "Top authors", &stats.top_authors);

    out.push_str(&format!("\n## Published in {}\n\n", stats.monthly.year));
    count_table(
        &mut out,
        ("Month", "Posts"),
        stats.monthly.labeled().map(|(m, n)| (m, n.to_string())),
    );

    out.push_str("\n## Last published\n\n");
    match &stats.last_published {
        Some(post) => out.push_str(&preview_line(post)),
        None => out.push_str("_Nothing published yet._\n"),
    }

    out.push_str("\n## Coming next\n\n");
    if stats.next_upcoming.is_empty() {
        out.push_str("_Nothing scheduled._\n");
    }
    for post in &stats.next_upcoming {
        out.push_str(&preview_line(post));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClefConfig;
    use crate::entity::{Post, PostDetails, RecordBase};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_render_accueil() {
        let at = |d: u32| Utc.with_ymd_and_hms(2024, 1, d, 9, 0, 0).unwrap();
        let posts = vec![
            Post {
                base: RecordBase::at(at(2)),
                details: PostDetails::new("Rentrée".to_string(), "Claire".to_string(), at(10)),
            },
            Post {
                base: RecordBase::at(at(3)),
                details: PostDetails::new("Concert".to_string(), "Marc".to_string(), at(15)),
            },
        ];
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let stats = PostStats::compute(&posts, today, &ClefConfig::default());

        let md = render_accueil(&stats).unwrap();
        assert!(md.starts_with("---\nview: accueil\n"));
        assert!(md.contains("| Total posts | 2 |"));
        assert!(md.contains("| INFO | 2 |"));
        assert!(md.contains("| Jan | 2 |"));
        assert!(md.contains("- Concert (2024-01-15)"));
        assert!(md.contains("## Coming next\n\n- Rentrée (2024-01-10)"));
    }

    #[test]
    fn test_render_empty() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let stats = PostStats::compute(&[], today, &ClefConfig::default());
        let md = render_accueil(&stats).unwrap();
        assert!(md.contains("_Nothing published yet._"));
        assert!(md.contains("_Nothing scheduled._"));
        assert!(md.contains("_No data._"));
    }
}
