//! Project management
//!
//! Handles project initialization and provides access to the task store.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::{Config, TaskStore};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in an agenda project. Run 'agenda init' first.")]
    NotInProject,

    #[error("Failed to create project: {0}")]
    CreateFailed(String),
}

const DEFAULT_CONFIG: &str = r#"# Agenda configuration

# Days past today included by 'agenda due'
lookahead_days = 0

# Show the parent task's title next to subtasks
show_parent = true

# strftime pattern for dates in text output
date_format = "%Y-%m-%d"
"#;

const GITIGNORE: &str = r#"# Ignore in-flight writes
*.tmp
"#;

/// An agenda project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let agenda_dir = root.join(".agenda");

        if !agenda_dir.is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    ///
    /// Safe to run on an existing project: files already present are kept.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let agenda_dir = root.join(".agenda");

        if agenda_dir.exists() && !agenda_dir.is_dir() {
            return Err(ProjectError::CreateFailed(format!(
                "{} exists and is not a directory",
                agenda_dir.display()
            ))
            .into());
        }

        fs::create_dir_all(&agenda_dir).with_context(|| {
            format!("Failed to create .agenda directory: {}", agenda_dir.display())
        })?;

        let config_path = agenda_dir.join("config.toml");
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let gitignore_path = agenda_dir.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(&gitignore_path, GITIGNORE).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .agenda directory path
    pub fn agenda_dir(&self) -> PathBuf {
        self.root.join(".agenda")
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the task store
    pub fn task_store(&self) -> TaskStore {
        TaskStore::for_project(&self.root)
    }
}
