//! The `agenda` command line
//!
//! ```text
//! agenda init [path]
//! agenda task add|list|show|start|done|reopen|dep|undep|reschedule|rm
//! agenda due [--on <date> | --days <n>] [--blocked]
//! agenda on <date>
//! agenda status
//! ```
//!
//! Dates are `YYYY-MM-DD`, `today`, `tomorrow`, `yesterday` or `+N`/`-N`
//! days from today. `--format json` prints one JSON document per command;
//! `--verbose` traces each step on stderr.

mod app;
mod output;
mod query;
mod task;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
