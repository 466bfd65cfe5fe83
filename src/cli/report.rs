//! Terminal reporting: the per-language stats table and the end-of-run
//! findings flush.
//!
//! Findings are collected during the whole run and printed here in one
//! deterministic batch, ordered by file and position.

use std::io::{self, Write};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use super::run::RunSummary;
use crate::findings::{Finding, LintKind, Report, Severity};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// How many advisory locations to show inline before pointing at the report file.
const MAX_ADVISORY_DISPLAY: usize = 3;

pub fn print(summary: &RunSummary, verbose: bool) {
    print_to(summary, verbose, &mut io::stdout().lock());
}

pub fn print_to<W: Write>(summary: &RunSummary, verbose: bool, writer: &mut W) {
    let _ = writeln!(
        writer,
        "Scanned {} file(s), skipped {}.",
        summary.scanned_files, summary.skipped_files
    );

    print_stats_table(summary, writer);
    print_findings(summary, writer);

    if verbose {
        for path in &summary.written {
            let _ = writeln!(writer, "  wrote {}", path.display());
        }
    }

    let errors = summary.diagnostics.count_by_severity(Severity::Error);
    let warnings = summary.diagnostics.count_by_severity(Severity::Warning);
    if errors == 0 && warnings == 0 {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            "Scan completed without extraction issues".green()
        );
    } else {
        let _ = writeln!(
            writer,
            "{}",
            format!("Scan completed with {errors} error(s), {warnings} warning(s)").yellow()
        );
    }
}

// ============================================================
// Stats table
// ============================================================

fn print_stats_table<W: Write>(summary: &RunSummary, writer: &mut W) {
    let header = [
        "Language",
        "Keys",
        "Translated",
        "Not Translated",
        "Fallback",
        "No Usage",
        "Words",
    ];

    // Target languages only; the native language has nothing to translate.
    let rows: Vec<[String; 7]> = summary
        .stats
        .iter()
        .filter(|(lang, _)| lang.as_str() != summary.native_lang)
        .map(|(lang, detail)| {
            [
                lang.clone(),
                detail.stats.scanned.to_string(),
                detail.stats.translated.to_string(),
                detail.stats.untranslated.to_string(),
                detail.stats.fallback.to_string(),
                detail.stats.unused.to_string(),
                detail.stats.words.to_string(),
            ]
        })
        .collect();

    if rows.is_empty() {
        return;
    }

    let mut widths: Vec<usize> = header.iter().map(|h| UnicodeWidthStr::width(*h)).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(UnicodeWidthStr::width(cell.as_str()));
        }
    }

    let pad = |cell: &str, width: usize| {
        let fill = width.saturating_sub(UnicodeWidthStr::width(cell));
        format!("{}{}", " ".repeat(fill), cell)
    };

    let header_line = header
        .iter()
        .enumerate()
        .map(|(i, cell)| pad(cell, widths[i]))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(writer, "{}", header_line.bold());

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| pad(cell, widths[i]))
            .collect();
        let _ = writeln!(
            writer,
            "{}  {}  {}  {}  {}  {}  {}",
            cells[0],
            cells[1],
            cells[2].green(),
            cells[3].red(),
            cells[4].yellow(),
            cells[5].dimmed(),
            cells[6].blue(),
        );
    }
}

// ============================================================
// Findings
// ============================================================

fn print_findings<W: Write>(summary: &RunSummary, writer: &mut W) {
    // Extraction findings one by one.
    for finding in summary.diagnostics.sorted() {
        if matches!(finding, Finding::Lint(_)) {
            continue;
        }
        let severity = match finding.severity() {
            Severity::Error => "error:".red().bold(),
            Severity::Warning => "warning:".yellow().bold(),
            Severity::Advice => "advice:".blue().bold(),
        };
        let _ = writeln!(writer, "{} {}", severity, finding.message());
        if let Some(location) = finding.location() {
            let _ = writeln!(writer, "  {} {}", "-->".blue(), location);
        }
    }

    // Advisory findings as grouped summaries pointing at the reports.
    let advisory = [
        (
            "unmarked native-script text",
            "unmarked.md",
            summary.diagnostics.lint_findings_where(LintKind::is_bare_text),
        ),
        (
            "hard-coded domain",
            "hard-code-of-domain.md",
            summary.diagnostics.lint_findings(LintKind::HardCodedDomain),
        ),
        (
            "string concatenation",
            "no-string-concat.md",
            summary
                .diagnostics
                .lint_findings(LintKind::StringConcatenation),
        ),
    ];

    for (label, report_file, findings) in advisory {
        if findings.is_empty() {
            continue;
        }
        let _ = writeln!(
            writer,
            "{} found {} {} occurrence(s):",
            "advice:".blue().bold(),
            findings.len(),
            label
        );
        for finding in findings.iter().take(MAX_ADVISORY_DISPLAY) {
            let _ = writeln!(
                writer,
                "  \"{}\" {}",
                finding.text.trim(),
                finding.location.to_string().blue().underline()
            );
        }
        if findings.len() > MAX_ADVISORY_DISPLAY {
            let _ = writeln!(
                writer,
                "  ... see {}",
                summary.output_dir.join(report_file).display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use super::*;
    use crate::findings::{Diagnostics, LintFinding, SourceLocation};
    use crate::reconcile::LangDetail;

    fn summary() -> RunSummary {
        let mut stats = BTreeMap::new();
        stats.insert("zh".to_string(), LangDetail::default());
        let mut en = LangDetail::default();
        en.stats.scanned = 2;
        en.stats.untranslated = 2;
        en.stats.words = 6;
        stats.insert("en".to_string(), en);

        RunSummary {
            native_lang: "zh".to_string(),
            stats,
            scanned_files: 2,
            skipped_files: 0,
            written: Vec::new(),
            diagnostics: Diagnostics::new(),
            output_dir: PathBuf::from("i18n"),
        }
    }

    #[test]
    fn table_lists_target_languages_only() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        print_to(&summary(), false, &mut out);
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Language"));
        assert!(text.contains("en"));
        // The native language row is omitted.
        assert!(!text.lines().any(|line| line.trim_start().starts_with("zh")));
        colored::control::unset_override();
    }

    #[test]
    fn advisory_summary_shows_count() {
        colored::control::set_override(false);
        let mut summary = summary();
        summary.diagnostics.push(LintFinding {
            location: SourceLocation::new("src/app.tsx", 3, 5),
            kind: LintKind::BareTextInMarkup,
            text: "你好".to_string(),
        });

        let mut out = Vec::new();
        print_to(&summary, false, &mut out);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("1 unmarked native-script text"));
        assert!(text.contains("src/app.tsx:3:5"));
        colored::control::unset_override();
    }
}
