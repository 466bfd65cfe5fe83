//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `scan`: Harvest translation entries and reconcile the translation project
//! - `init`: Initialize a sickle configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Scan(cmd)) => cmd.args.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Source code root directory (config file is searched from here)
    #[arg(long)]
    pub source_root: Option<PathBuf>,

    /// Project output directory (overrides config file)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Native language of the source tree (overrides config file)
    #[arg(long)]
    pub native_lang: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Parser)]
pub struct ScanArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Keep rows no longer referenced by the scan (no obsolescence marking)
    #[arg(long)]
    pub append: bool,

    /// Export one untranslated/<lang>.untranslated.json per language
    #[arg(long)]
    pub export_untranslated: bool,
}

#[derive(Debug, Args)]
pub struct ScanCommand {
    #[command(flatten)]
    pub args: ScanArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan source files and reconcile the translation project
    Scan(ScanCommand),
    /// Initialize a new .sicklerc.json configuration file
    Init,
}
