//! Main CLI application structure

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{query, task};
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "agenda")]
#[command(author, version, about = "Local-first list of dated tasks that are ready to start")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config's default_format)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new agenda project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Manage tasks
    #[command(subcommand)]
    Task(task::TaskCommands),

    /// Show tasks that are due and ready to start
    Due {
        /// Cut-off date (YYYY-MM-DD, today, tomorrow, +N, -N)
        #[arg(long, conflicts_with = "days", allow_hyphen_values = true)]
        on: Option<String>,

        /// Days past today to include (defaults to lookahead_days)
        #[arg(long)]
        days: Option<u32>,

        /// Show due tasks that are still waiting on prerequisites instead
        #[arg(long)]
        blocked: bool,
    },

    /// Show open tasks due on one date
    On {
        /// Date (YYYY-MM-DD, today, tomorrow, +N, -N)
        #[arg(allow_hyphen_values = true)]
        date: String,
    },

    /// Show project status overview
    Status,
}

/// Main entry point for the CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let format = match cli.format {
        Some(format) => Ok(format),
        None => Config::load_global().map(|global| global.default_format.into()),
    };
    let output = Output::new(
        format.as_ref().copied().unwrap_or_default(),
        cli.verbose,
    );

    output.verbose("Agenda starting");

    match format.and_then(|_| execute(cli.command, &output)) {
        Ok(()) => {
            output.verbose("Command completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            output.error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn execute(command: Commands, output: &Output) -> Result<()> {
    match command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path));
            let project = Project::init(&path)?;
            output.verbose_ctx(
                "init",
                &format!("Created .agenda directory at: {}", project.agenda_dir().display()),
            );
            output.success(&format!(
                "Initialized agenda project at {}",
                project.root().display()
            ));
        }

        Commands::Task(cmd) => task::run(cmd, output)?,

        Commands::Due { on, days, blocked } => {
            output.verbose_ctx(
                "due",
                &format!("Querying due tasks: on={:?}, days={:?}, blocked={}", on, days, blocked),
            );
            if blocked {
                query::blocked(output, on.as_deref(), days)?
            } else {
                query::due(output, on.as_deref(), days)?
            }
        }

        Commands::On { date } => {
            output.verbose_ctx("on", &format!("Looking up tasks due on: {}", date));
            query::on(output, &date)?
        }

        Commands::Status => {
            output.verbose("Gathering project status");
            query::status(output)?
        }
    }

    Ok(())
}
