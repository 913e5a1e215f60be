//! Text or JSON rendering of command results
//!
//! Results go to stdout. Errors and `--verbose` traces go to stderr so JSON
//! on stdout stays parseable.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;

use crate::storage;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl From<storage::OutputFormat> for OutputFormat {
    fn from(format: storage::OutputFormat) -> Self {
        match format {
            storage::OutputFormat::Text => OutputFormat::Text,
            storage::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

pub struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Emits `data` as one JSON line, or runs `text` to print a table
    pub fn render<T: Serialize>(&self, data: &T, text: impl FnOnce()) -> Result<()> {
        if self.is_json() {
            self.data(data)
        } else {
            text();
            Ok(())
        }
    }

    /// Writes one JSON document to stdout
    pub fn data<T: Serialize>(&self, data: &T) -> Result<()> {
        let line = serde_json::to_string(data).context("Failed to encode JSON output")?;
        println!("{}", line);
        Ok(())
    }

    /// Confirms a change
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => println!("{}", json!({ "success": true, "message": message })),
        }
    }

    /// Reports a failed command on stderr
    pub fn error(&self, message: &str) {
        match self.format {
            OutputFormat::Text => eprintln!("Error: {}", message),
            OutputFormat::Json => eprintln!("{}", json!({ "success": false, "error": message })),
        }
    }

    pub fn verbose(&self, message: &str) {
        self.trace(None, message);
    }

    /// Verbose trace tagged with the command area, e.g. `[verbose:due]`
    pub fn verbose_ctx(&self, context: &str, message: &str) {
        self.trace(Some(context), message);
    }

    fn trace(&self, context: Option<&str>, message: &str) {
        if !self.verbose {
            return;
        }
        match context {
            Some(context) => eprintln!("[verbose:{}] {}", context, message),
            None => eprintln!("[verbose] {}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn format_from_config() {
        assert_eq!(OutputFormat::from(storage::OutputFormat::Json), OutputFormat::Json);
        assert_eq!(OutputFormat::from(storage::OutputFormat::Text), OutputFormat::Text);
    }

    #[test]
    fn render_runs_text_only_in_text_mode() {
        let printed = Cell::new(false);

        Output::new(OutputFormat::Json, false)
            .render(&json!({ "tasks": [] }), || printed.set(true))
            .unwrap();
        assert!(!printed.get());

        Output::new(OutputFormat::Text, false)
            .render(&json!({ "tasks": [] }), || printed.set(true))
            .unwrap();
        assert!(printed.get());
    }
}
