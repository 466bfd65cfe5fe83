//! Source file discovery.
//!
//! Include patterns may be literal directories or globs; ignore patterns
//! likewise. The resulting file list is sorted by path so every later stage
//! of the run sees files in the same order on every machine.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use colored::Colorize;
use glob::{Pattern, glob};
use regex::Regex;
use walkdir::WalkDir;

/// Extensions considered source code.
const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx"];

static NOSCAN_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"//\s*@i18n-noscan(\s|$)").expect("static pattern compiles"));

/// True when the file opted out of scanning with an `@i18n-noscan` comment.
pub fn is_opted_out(content: &str) -> bool {
    NOSCAN_MARKER.is_match(content)
}

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are treated as literal directory paths.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Result of scanning for source files.
pub struct SourceScan {
    /// Sorted relative-ish paths of every scannable source file.
    pub files: Vec<String>,
    pub skipped_count: usize,
}

pub fn scan_source_files(
    base_dir: &str,
    includes: &[String],
    ignore_patterns: &[String],
    verbose: bool,
) -> SourceScan {
    let mut files: BTreeSet<String> = BTreeSet::new();
    let mut skipped_count = 0;

    let mut literal_ignore_paths: Vec<PathBuf> = Vec::new();
    let mut glob_ignores: Vec<Pattern> = Vec::new();

    for p in ignore_patterns {
        if is_glob_pattern(p) {
            match Pattern::new(p) {
                Ok(pattern) => glob_ignores.push(pattern),
                Err(e) => {
                    if verbose {
                        eprintln!(
                            "{} Invalid ignore pattern '{}': {}",
                            "warning:".bold().yellow(),
                            p,
                            e
                        );
                    }
                }
            }
        } else {
            literal_ignore_paths.push(Path::new(base_dir).join(p));
        }
    }

    let dirs_to_scan: Vec<PathBuf> = if includes.is_empty() {
        vec![Path::new(base_dir).to_path_buf()]
    } else {
        let mut paths = Vec::new();
        for inc in includes {
            if is_glob_pattern(inc) {
                let full_pattern = Path::new(base_dir).join(inc);
                let pattern_str = full_pattern.to_string_lossy();
                match glob(&pattern_str) {
                    Ok(entries) => {
                        for entry in entries.flatten() {
                            if entry.is_dir() {
                                paths.push(entry);
                            }
                        }
                    }
                    Err(e) => {
                        if verbose {
                            eprintln!(
                                "{} Invalid glob pattern '{}': {}",
                                "warning:".bold().yellow(),
                                inc,
                                e
                            );
                        }
                    }
                }
            } else {
                let path = Path::new(base_dir).join(inc);
                if path.exists() {
                    paths.push(path);
                } else if verbose {
                    eprintln!(
                        "{} Include path does not exist: {}",
                        "warning:".bold().yellow(),
                        path.display()
                    );
                }
            }
        }
        paths
    };

    for dir in dirs_to_scan {
        for entry in WalkDir::new(dir) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    skipped_count += 1;
                    if verbose {
                        eprintln!("{} Cannot access path: {}", "warning:".bold().yellow(), e);
                    }
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }

            let is_source = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext));
            if !is_source {
                continue;
            }

            if literal_ignore_paths.iter().any(|p| path.starts_with(p)) {
                continue;
            }

            let path_str = path.to_string_lossy();
            if glob_ignores.iter().any(|p| p.matches(&path_str)) {
                continue;
            }

            files.insert(path_str.into_owned());
        }
    }

    SourceScan {
        files: files.into_iter().collect(),
        skipped_count,
    }
}
