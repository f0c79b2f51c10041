use crate::error::{CategorizerError, Result};
use crate::workbook::{WriteOptions, DEFAULT_HIGHLIGHT_COLOR};
use furniture_categorizer_common::MatchMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Overrides `taxonomy_path` when set.
pub const TAXONOMY_ENV: &str = "FURNITURE_TAXONOMY";

pub const DEFAULT_OUTPUT_FILE_NAME: &str = "categorized_furniture.xlsx";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `RRGGBB` fill for uncategorized rows.
    pub highlight_color: String,
    pub taxonomy_path: Option<PathBuf>,
    pub boundary_only: bool,
    pub strict_row_count: bool,
    pub output_file_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            highlight_color: DEFAULT_HIGHLIGHT_COLOR.into(),
            taxonomy_path: None,
            boundary_only: false,
            strict_row_count: false,
            output_file_name: DEFAULT_OUTPUT_FILE_NAME.into(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CategorizerError::Config("home directory not found".into()))?;
        Ok(home
            .join(".config")
            .join("furniture-categorizer")
            .join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        validate_color(&self.highlight_color)?;
        if self.output_file_name.trim().is_empty() {
            return Err(CategorizerError::Config("output_file_name is empty".into()));
        }
        Ok(())
    }

    pub fn set_highlight_color(&mut self, color: &str) -> Result<()> {
        let color = color.trim_start_matches('#').to_ascii_uppercase();
        validate_color(&color)?;
        self.highlight_color = color;
        Ok(())
    }

    /// Environment variable first, then the saved path.
    pub fn taxonomy_path(&self) -> Option<PathBuf> {
        match std::env::var(TAXONOMY_ENV) {
            Ok(path) if !path.trim().is_empty() => Some(PathBuf::from(path)),
            _ => self.taxonomy_path.clone(),
        }
    }

    pub fn match_mode(&self) -> MatchMode {
        if self.boundary_only {
            MatchMode::BoundaryOnly
        } else {
            MatchMode::BoundaryAndPartial
        }
    }

    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            highlight_color: self.highlight_color.clone(),
            strict_row_count: self.strict_row_count,
        }
    }
}

fn validate_color(color: &str) -> Result<()> {
    let color = color.trim_start_matches('#');
    if color.len() == 6 && color.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(CategorizerError::Config(format!(
            "highlight color must be six hex digits (RRGGBB), got '{}'",
            color
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.highlight_color, "FFCCCC");
        assert_eq!(config.output_file_name, "categorized_furniture.xlsx");
        assert_eq!(config.match_mode(), MatchMode::BoundaryAndPartial);
        assert_eq!(config.write_options(), WriteOptions::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.set_highlight_color("#ffee99").unwrap();
        config.boundary_only = true;
        config.taxonomy_path = Some(PathBuf::from("/data/taxonomy.json"));
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.highlight_color, "FFEE99");
        assert_eq!(loaded.match_mode(), MatchMode::BoundaryOnly);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"strict_row_count": true}"#).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(loaded.strict_row_count);
        assert_eq!(loaded.highlight_color, "FFCCCC");
    }

    #[test]
    fn test_invalid_color() {
        let mut config = Config::default();
        assert!(config.set_highlight_color("red").is_err());
        assert!(config.set_highlight_color("FFCCCCAA").is_err());
        assert_eq!(config.highlight_color, "FFCCCC");

        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"highlight_color": "zzzzzz"}"#).unwrap();
        assert!(matches!(Config::load_from(&path), Err(CategorizerError::Config(_))));
    }
}
