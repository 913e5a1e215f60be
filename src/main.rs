//! Agenda - local-first due-task tracking

use std::process::ExitCode;

fn main() -> ExitCode {
    agenda_cli::cli::run()
}
