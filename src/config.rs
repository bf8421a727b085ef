use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ClefError, Result};

const CONFIG_FILE: &str = "config.yaml";

/// Presentation limits for lists and statistics, read from `.clef/config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClefConfig {
    /// Rows per page in post and archive lists
    pub page_size: usize,
    /// Authors shown in the "top authors" card
    pub top_authors: usize,
    /// Posts shown in the "coming next" preview
    pub upcoming_preview: usize,
    /// Groups kept before folding the rest into `other_label`
    pub top_groups: usize,
    pub other_label: String,
}

impl Default for ClefConfig {
    fn default() -> Self {
        Self {
            page_size: 12,
            top_authors: 3,
            upcoming_preview: 3,
            top_groups: 8,
            other_label: "Others".to_string(),
        }
    }
}

impl ClefConfig {
    /// Load the config from a `.clef` directory; a missing file means defaults.
    pub fn load(clef_dir: &Path) -> Result<Self> {
        let path = clef_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(&path)?;
        let config: ClefConfig = serde_yaml::from_str(&raw)
            .map_err(|e| ClefError::Config(format!("{}: {}", path.display(), e)))?;
        config.check()?;
        Ok(config)
    }

    pub fn save(&self, clef_dir: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .map_err(|e| ClefError::Config(format!("YAML serialization failed: {}", e)))?;
        fs::write(clef_dir.join(CONFIG_FILE), yaml)?;
        Ok(())
    }

    fn check(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(ClefError::Config("page_size must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = ClefConfig::load(tmp.path()).unwrap();
        assert_eq!(config, ClefConfig::default());
        assert_eq!(config.page_size, 12);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "top_groups: 5\n").unwrap();
        let config = ClefConfig::load(tmp.path()).unwrap();
        assert_eq!(config.top_groups, 5);
        assert_eq!(config.top_authors, 3);
    }

    #[test]
    fn test_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let config = ClefConfig {
            other_label: "Autres".to_string(),
            ..Default::default()
        };
        config.save(tmp.path()).unwrap();
        assert_eq!(ClefConfig::load(tmp.path()).unwrap(), config);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "page_size: 0\n").unwrap();
        assert!(matches!(
            ClefConfig::load(tmp.path()),
            Err(ClefError::Config(_))
        ));
    }
}
