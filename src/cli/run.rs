//! Command dispatch and the scan orchestration.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use colored::Colorize;

use super::args::{Arguments, Command, ScanCommand};
use crate::config::{CONFIG_FILE_NAME, default_config_json, load_config};
use crate::core::file_scanner::scan_source_files;
use crate::core::scan::scan_sources;
use crate::findings::Diagnostics;
use crate::reconcile::{LangDetail, reconcile, write_artifacts};
use crate::store::TranslationProject;

/// Result of one scan run, ready for reporting.
pub struct RunSummary {
    pub native_lang: String,
    pub stats: std::collections::BTreeMap<String, LangDetail>,
    pub scanned_files: usize,
    pub skipped_files: usize,
    pub written: Vec<PathBuf>,
    pub diagnostics: Diagnostics,
    pub output_dir: PathBuf,
}

pub enum CommandOutcome {
    Scan(Box<RunSummary>),
    Init { path: PathBuf },
}

pub fn run(Arguments { command }: Arguments) -> Result<CommandOutcome> {
    match command {
        Some(Command::Scan(cmd)) => Ok(CommandOutcome::Scan(Box::new(scan(cmd)?))),
        Some(Command::Init) => init().map(|path| CommandOutcome::Init { path }),
        None => {
            anyhow::bail!("No command provided. Use --help to see available commands.")
        }
    }
}

fn init() -> Result<PathBuf> {
    let config_path = Path::new(CONFIG_FILE_NAME);
    if config_path.exists() {
        anyhow::bail!("{} already exists", CONFIG_FILE_NAME);
    }

    fs::write(config_path, default_config_json()?)?;
    Ok(config_path.to_path_buf())
}

fn scan(cmd: ScanCommand) -> Result<RunSummary> {
    let common = &cmd.args.common;
    let verbose = common.verbose;

    let source_root = common
        .source_root
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let root_path = source_root
        .to_str()
        .with_context(|| format!("Invalid path: {:?}", source_root))?;

    // Config file < CLI flags.
    let config_result = load_config(Path::new(root_path))?;
    if verbose && !config_result.from_file {
        eprintln!("Note: No {} found, using default configuration", CONFIG_FILE_NAME);
    }

    let mut config = config_result.config;
    if let Some(output) = &common.output {
        config.output = output.to_string_lossy().to_string();
    }
    if let Some(native_lang) = &common.native_lang {
        config.native_lang = native_lang.clone();
    }
    if cmd.args.append {
        config.append_mode = true;
    }
    config.validate()?;

    // Discover and scan source files.
    let source_scan = scan_source_files(root_path, &config.includes, &config.ignores, verbose);
    if source_scan.skipped_count > 0 {
        eprintln!(
            "{} {} path(s) skipped due to access errors{}",
            "warning:".bold().yellow(),
            source_scan.skipped_count,
            if verbose { "" } else { " (use -v for details)" }
        );
    }

    let run = scan_sources(&config, &source_scan.files)?;

    // Bring up the translation project: load persisted project sources,
    // bootstrap from legacy resource files where none exist yet.
    let mut project = TranslationProject::new(&config.native_lang, &config.script_free_langs);
    let output_dir = source_root.join(&config.output);
    let source_dir = output_dir.join("source");
    let mut preexisting_langs: HashSet<String> = HashSet::new();

    for lang in config.ordered_langs() {
        if source_dir.join(format!("{lang}.json")).exists() {
            if lang != config.native_lang {
                preexisting_langs.insert(lang.clone());
            }
            project.load(&source_dir, &lang)?;
        } else {
            project.bootstrap(&config.resource_path(&source_root, &lang), &lang)?;
        }
    }

    let outcome = reconcile(
        &mut project,
        &run.collector,
        &config.ordered_langs(),
        &config.fallback_langs,
        config.append_mode,
    );

    let written = write_artifacts(
        &source_root,
        &config,
        &project,
        &outcome,
        &run.collector,
        &run.diagnostics,
        &preexisting_langs,
        cmd.args.export_untranslated,
    )?;

    Ok(RunSummary {
        native_lang: config.native_lang,
        stats: outcome.stats,
        scanned_files: run.scanned_files,
        skipped_files: run.skipped_files,
        written: written.files,
        diagnostics: run.diagnostics,
        output_dir,
    })
}
