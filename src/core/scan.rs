//! Per-run scan driver.
//!
//! File reading and parsing run in parallel because they share no state.
//! Extraction then runs sequentially over the path-sorted file list, so the
//! collision registry and every reported finding come out in the same order
//! on every run over identical input.

use std::sync::Arc;

use anyhow::Result;
use rayon::prelude::*;
use regex::Regex;
use swc_common::SourceMap;

use crate::config::Config;
use crate::core::entry::ScanCollector;
use crate::core::file_scanner::is_opted_out;
use crate::core::invocation::InvocationExtractor;
use crate::core::key::KeyRegistry;
use crate::core::markup::MarkupExtractor;
use crate::core::parsers::jsx::{ParseDiagnostic, ParsedSource, parse_source};
use crate::findings::{Diagnostics, ParseFailureFinding, SourceLocation};
use crate::lint::Linter;

/// Everything a scan pass produced, ready for reconciliation.
#[derive(Debug)]
pub struct ScanRun {
    pub collector: ScanCollector,
    pub diagnostics: Diagnostics,
    /// Files that were considered (after the opt-out marker filter).
    pub scanned_files: usize,
    /// Files skipped because of the opt-out marker or unreadable content.
    pub skipped_files: usize,
}

enum FileState {
    OptedOut,
    Unreadable(String),
    Parsed(String, ParsedSource),
    Broken(String, ParseDiagnostic),
}

/// Scan the given source files. `files` must already be sorted.
pub fn scan_sources(config: &Config, files: &[String]) -> Result<ScanRun> {
    let invocation = InvocationExtractor::new(&config.func_list)?;
    let domain_pattern = Regex::new(&config.domain_pattern)?;

    // Read and parse in parallel; nothing here touches shared state.
    let parsed: Vec<(String, FileState)> = files
        .par_iter()
        .map(|file_path| {
            let state = match std::fs::read_to_string(file_path) {
                Err(err) => FileState::Unreadable(err.to_string()),
                Ok(content) if is_opted_out(&content) => FileState::OptedOut,
                Ok(content) => {
                    let source_map = Arc::new(SourceMap::default());
                    match parse_source(content.clone(), file_path, source_map) {
                        Ok(source) => FileState::Parsed(content, source),
                        Err(diag) => FileState::Broken(content, diag),
                    }
                }
            };
            (file_path.clone(), state)
        })
        .collect();

    // Sequential extraction in input order.
    let mut registry = KeyRegistry::new();
    let mut diagnostics = Diagnostics::new();
    let mut collector = ScanCollector::new();
    let mut scanned_files = 0;
    let mut skipped_files = 0;

    for (file_path, state) in parsed {
        match state {
            FileState::OptedOut => skipped_files += 1,
            FileState::Unreadable(detail) => {
                skipped_files += 1;
                diagnostics.push(ParseFailureFinding {
                    location: SourceLocation::new(&file_path, 1, 1),
                    snippet: None,
                    detail,
                });
            }
            FileState::Broken(content, diag) => {
                // The raw-text extractor still works on files the parser
                // cannot swallow; only the markup pass is abandoned.
                scanned_files += 1;
                invocation.extract(
                    &content,
                    &file_path,
                    &mut registry,
                    &mut diagnostics,
                    &mut collector,
                );
                diagnostics.push(ParseFailureFinding {
                    location: SourceLocation::new(&file_path, diag.line, diag.column),
                    snippet: None,
                    detail: diag.message,
                });
            }
            FileState::Parsed(content, source) => {
                scanned_files += 1;
                invocation.extract(
                    &content,
                    &file_path,
                    &mut registry,
                    &mut diagnostics,
                    &mut collector,
                );

                MarkupExtractor::new(
                    &file_path,
                    &source.source_map,
                    &config.trans_component,
                    &config.key_attr,
                    &config.defaults_attr,
                    &config.func_list,
                    &mut registry,
                    &mut diagnostics,
                    &mut collector,
                )
                .run(&source.module);

                let lint_findings = Linter::new(
                    &file_path,
                    &source.source_map,
                    &config.trans_component,
                    &config.func_list,
                    &domain_pattern,
                )
                .run(&source.module);
                for finding in lint_findings {
                    diagnostics.push(finding);
                }
            }
        }
    }

    Ok(ScanRun {
        collector,
        diagnostics,
        scanned_files,
        skipped_files,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::core::key::hash_key;

    #[test]
    fn scans_invocations_and_markup_together() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.tsx");
        let b = dir.path().join("b.tsx");
        fs::write(&a, "export const greeting = t(\"问候语\", \"你好\");").unwrap();
        fs::write(
            &b,
            "export const Farewell = () => <Trans>再见{{ name: user.name }}</Trans>;",
        )
        .unwrap();

        let config = Config::default();
        let files = vec![
            a.to_string_lossy().into_owned(),
            b.to_string_lossy().into_owned(),
        ];
        let run = scan_sources(&config, &files).unwrap();

        assert_eq!(run.scanned_files, 2);
        assert!(run.collector.contains_key(&hash_key("问候语")));
        assert!(run.collector.contains_key(&hash_key("再见{{name}}")));
    }

    #[test]
    fn opted_out_file_is_skipped() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.ts");
        fs::write(&a, "// @i18n-noscan\nconst x = t(\"你好\");").unwrap();

        let config = Config::default();
        let run = scan_sources(&config, &[a.to_string_lossy().into_owned()]).unwrap();

        assert_eq!(run.scanned_files, 0);
        assert_eq!(run.skipped_files, 1);
        assert!(run.collector.is_empty());
    }

    #[test]
    fn broken_file_still_yields_raw_matches() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.ts");
        fs::write(&a, "const x = t(\"标题\"); function {{{").unwrap();

        let config = Config::default();
        let run = scan_sources(&config, &[a.to_string_lossy().into_owned()]).unwrap();

        assert!(run.collector.contains_key(&hash_key("标题")));
        assert!(!run.diagnostics.is_empty());
    }
}
