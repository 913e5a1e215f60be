//! Files under a project's `.agenda/` directory
//!
//! ```text
//! .agenda/
//! ├── tasks.jsonl   append-only task log (TaskStore)
//! ├── config.toml   lookahead_days, show_parent, date_format
//! └── .gitignore    keeps half-written *.tmp rewrites out of git
//! ```
//!
//! The global config only sets `default_format` and lives in the platform
//! config directory under `agenda-cli/`.

mod config;
mod jsonl;
mod project;

pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig};
pub use jsonl::TaskStore;
pub use project::{Project, ProjectError};
