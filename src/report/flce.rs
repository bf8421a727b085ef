// src/report/flce.rs
//! FLCE registration report

use chrono::NaiveDate;
use serde::Serialize;

use crate::entity::RecordKind;
use crate::stats::{StudentStats, MONTH_LABELS};
use crate::Result;

use super::{count_table, group_table, yaml_frontmatter};

#[derive(Serialize)]
struct FlceFrontmatter {
    view: &'static str,
    today: NaiveDate,
    total: usize,
    conversion_rate: u32,
}

pub fn render_flce(stats: &StudentStats) -> Result<String> {
    let mut out = yaml_frontmatter(&FlceFrontmatter {
        view: "flce",
        today: stats.today,
        total: stats.total,
        conversion_rate: stats.rates.conversion,
    })?;

    out.push_str("\n# FLCE statistics\n\n");
    let rates = [
        stats.rates.conversion,
        stats.rates.pre_registered,
        stats.rates.lead,
        stats.rates.left,
    ];
    let kinds: Vec<String> = RecordKind::ALL.iter().map(|k| k.to_string()).collect();
    count_table(
        &mut out,
        ("Status", "Students"),
        kinds.iter().zip(RecordKind::ALL).zip(rates).map(|((label, kind), rate)| {
            (label.as_str(), format!("{} ({}%)", stats.status.get(kind), rate))
        }),
    );

    out.push_str("\n## Profile\n\n");
    let g = &stats.gender;
    count_table(
        &mut out,
        ("Field", "Count"),
        [
            ("Male", g.male.to_string()),
            ("Female", g.female.to_string()),
            ("Other", g.other.to_string()),
            ("Unknown gender", g.unknown.to_string()),
            ("Au pair", stats.au_pair.yes.to_string()),
            ("Not au pair", stats.au_pair.no.to_string()),
            ("Staying today", stats.stays.active_today.to_string()),
            ("Arriving later", stats.stays.upcoming.to_string()),
        ],
    );

    group_table(&mut out, "Classes", &stats.classes);
    group_table(&mut out, "Birth places", &stats.birth_places);
    group_table(&mut out, "Ages", &stats.age_buckets);

    out.push_str("\n## Arrivals by month\n\n");
    count_table(
        &mut out,
        ("Month", "Arrivals"),
        MONTH_LABELS
            .iter()
            .copied()
            .zip(stats.arrivals.iter().map(|n| n.to_string())),
    );

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClefConfig;
    use crate::entity::{Student, StudentDetails};

    #[test]
    fn test_render_flce() {
        let enrolled = Student::new(StudentDetails {
            first_name: "Ana".to_string(),
            paid_total: true,
            class_code: Some("b1".to_string()),
            arrival_date: NaiveDate::from_ymd_opt(2024, 3, 4),
            ..Default::default()
        });
        let lead = Student::new(StudentDetails {
            first_name: "Bo".to_string(),
            ..Default::default()
        });
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let stats = StudentStats::compute(&[enrolled, lead], today, &ClefConfig::default());

        let md = render_flce(&stats).unwrap();
        assert!(md.starts_with("---\nview: flce\n"));
        assert!(md.contains("conversion_rate: 50"));
        assert!(md.contains("| ENROLLED | 1 (50%) |"));
        assert!(md.contains("| LEAD | 1 (50%) |"));
        assert!(md.contains("| LEFT | 0 (0%) |"));
        assert!(md.contains("| B1 | 1 |"));
        assert!(md.contains("| Mar | 1 |"));
    }
}
