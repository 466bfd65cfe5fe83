use anyhow::Result;

pub mod args;
mod exit_status;
mod report;
mod run;

pub use args::{Arguments, Command};
pub use exit_status::ExitStatus;
pub use run::{CommandOutcome, RunSummary};

use crate::findings::Severity;

pub fn run_cli(args: Arguments) -> Result<ExitStatus> {
    let verbose = args.verbose();

    let Some(args) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success);
    };

    match run::run(args)? {
        CommandOutcome::Init { path } => {
            println!("Created {}", path.display());
            Ok(ExitStatus::Success)
        }
        CommandOutcome::Scan(summary) => {
            report::print(&summary, verbose);
            if summary.diagnostics.count_by_severity(Severity::Error) > 0 {
                Ok(ExitStatus::Failure)
            } else {
                Ok(ExitStatus::Success)
            }
        }
    }
}
