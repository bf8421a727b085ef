// src/report/mod.rs
//! Markdown rendering of the statistics views

mod accueil;
mod flce;

pub use accueil::render_accueil;
pub use flce::render_flce;

use crate::error::{ClefError, Result};
use crate::stats::GroupCount;

/// Generate YAML frontmatter block
pub fn yaml_frontmatter<T: serde::Serialize>(data: &T) -> Result<String> {
    let yaml = serde_yaml::to_string(data)
        .map_err(|e| ClefError::Config(format!("YAML serialization failed: {}", e)))?;
    Ok(format!("---\n{}---\n", yaml))
}

/// Two-column markdown table
fn count_table<'a, I>(out: &mut String, header: (&str, &str), rows: I)
where
    I: IntoIterator<Item = (&'a str, String)>,
{
    out.push_str(&format!("| {} | {} |\n", header.0, header.1));
    out.push_str("|------|-------|\n");
    for (label, value) in rows {
        out.push_str(&format!("| {} | {} |\n", label, value));
    }
}

fn group_table(out: &mut String, title: &str, groups: &[GroupCount]) {
    out.push_str(&format!("\n## {}\n\n", title));
    if groups.is_empty() {
        out.push_str("_No data._\n");
        return;
    }
    count_table(
        out,
        ("Group", "Count"),
        groups.iter().map(|g| (g.label.as_str(), g.count.to_string())),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_frontmatter_format() {
        #[derive(serde::Serialize)]
        struct TestFrontmatter {
            view: String,
            total: usize,
        }

        let fm = TestFrontmatter {
            view: "flce".to_string(),
            total: 4,
        };

        let result = yaml_frontmatter(&fm).unwrap();
        assert!(result.starts_with("---\n"));
        assert!(result.ends_with("---\n"));
        assert!(result.contains("view: flce"));
        assert!(result.contains("total: 4"));
    }

    #[test]
    fn test_group_table_empty() {
        let mut out = String::new();
        group_table(&mut out, "Classes", &[]);
        assert!(out.contains("## Classes"));
        assert!(out.contains("_No data._"));
    }
}
