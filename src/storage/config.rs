//! Configuration handling for Agenda
//!
//! Configuration is stored in `.agenda/config.toml` (project) and
//! `agenda-cli/config.toml` under the platform config directory (global,
//! e.g. `~/.config/agenda-cli/config.toml` on Linux).

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Days past today that `agenda due` looks ahead by default
    pub lookahead_days: u32,

    /// Append the parent task's title to subtask summaries
    pub show_parent: bool,

    /// strftime pattern for dates in text output
    pub date_format: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            lookahead_days: 0,
            show_parent: true,
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

impl ProjectConfig {
    /// Rejects settings that would fail later at render time
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.date_format.trim().is_empty() {
            return Err(ConfigError::Invalid("date_format is empty".to_string()));
        }
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::Invalid(format!(
                "date_format '{}' is not a valid strftime pattern",
                self.date_format
            )));
        }
        // Time and offset specifiers parse fine but a bare date cannot render them
        let mut sample = String::new();
        if write!(sample, "{}", NaiveDate::MIN.format(&self.date_format)).is_err() {
            return Err(ConfigError::Invalid(format!(
                "date_format '{}' uses fields a date does not have",
                self.date_format
            )));
        }
        Ok(())
    }

    /// Renders a date with the configured pattern
    pub fn format_date(&self, date: NaiveDate) -> String {
        date.format(&self.date_format).to_string()
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Output format used when `--format` is not given
    pub default_format: OutputFormat,
}

/// Output format preference stored in the global config
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Configuration in effect for an open project
///
/// The global file is read separately by the CLI before any project is
/// opened, since it decides how errors are printed.
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
}

impl Config {
    /// Loads configuration for a specific project
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let project = Self::load_project_config(project_root)?;
        Ok(Self { project })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "agenda", "agenda-cli")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    pub fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads project configuration from a specific root
    fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = project_root.join(".agenda").join("config.toml");

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")?;

        config
            .validate()
            .with_context(|| format!("Bad project config: {}", config_path.display()))?;

        Ok(config)
    }

    /// Finds the project root by looking for an `.agenda/` directory
    pub fn find_project_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_project_root_from(&current)
    }

    /// Walks up from `start` looking for an `.agenda/` directory
    pub fn find_project_root_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|dir| dir.join(".agenda").is_dir())
            .map(Path::to_path_buf)
    }
}
