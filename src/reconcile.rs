//! Reconciliation of a scan's key set against the translation project, and
//! the output artifacts derived from it.
//!
//! For every configured language the scan's keys are classified as
//! translated, untranslated (added to the project and weighed for the word
//! statistic), or untranslated-with-fallback. Afterwards the project's rows
//! are swept for unused and obsolete entries. The whole pass is idempotent:
//! repeating it with an unchanged scan and an unchanged project produces
//! identical statistics and an identical obsolete set.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;

use crate::config::Config;
use crate::core::entry::ScanCollector;
use crate::core::key::base_key;
use crate::findings::{Diagnostics, LintFinding, LintKind};
use crate::store::TranslationProject;
use crate::utils::count_translation_units;

/// Per-language counters.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LangStats {
    pub scanned: usize,
    pub translated: usize,
    pub untranslated: usize,
    pub fallback: usize,
    pub unused: usize,
    pub words: usize,
}

/// Per-language detail for the stats artifact.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LangDetail {
    #[serde(flatten)]
    pub stats: LangStats,
    pub untranslated_keys: Vec<String>,
    pub unused_keys: Vec<String>,
}

/// Everything reconciliation produced for one run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Language → counters and key lists, in configured language order.
    pub stats: BTreeMap<String, LangDetail>,
    /// Language → resource rows (translated or fallback text), non-native only.
    pub resources: BTreeMap<String, BTreeMap<String, String>>,
    /// Language → keys still missing a translation, with their native text.
    pub untranslated: BTreeMap<String, BTreeMap<String, String>>,
}

/// Diff the scan against the project for every language.
///
/// The native language must be processed first so freshly scanned native
/// sentences are in place before target languages compare against them;
/// `Config::ordered_langs` guarantees that order.
pub fn reconcile(
    project: &mut TranslationProject,
    scan: &ScanCollector,
    langs: &[String],
    fallback_langs: &BTreeMap<String, String>,
    append_mode: bool,
) -> ReconcileOutcome {
    let native = project.native_lang().to_string();
    let mut outcome = ReconcileOutcome::default();

    let used_base_keys: HashSet<String> = scan
        .entries()
        .iter()
        .filter(|(_, entry)| !entry.default_value.is_empty())
        .map(|(key, _)| base_key(key).to_string())
        .collect();

    for lang in langs {
        let fallback = fallback_langs.get(lang);
        let mut detail = LangDetail::default();
        let mut resource_rows: BTreeMap<String, String> = BTreeMap::new();
        let mut untranslated_rows: BTreeMap<String, String> = BTreeMap::new();

        for (key, entry) in scan.entries() {
            // Empty sentences carry nothing worth translating.
            if entry.default_value.is_empty() {
                continue;
            }
            detail.stats.scanned += 1;

            let mut translated = project.get(key, lang).map(str::to_owned);
            if translated.is_some() {
                detail.stats.translated += 1;
            } else {
                project.add(key, lang, &entry.default_value);
                detail.stats.untranslated += 1;
                detail.stats.words += count_translation_units(&entry.default_value);
                detail.untranslated_keys.push(key.clone());

                // One level of fallback only; chains are not followed.
                if let Some(fallback_lang) = fallback
                    && let Some(fallback_text) = project.get(key, fallback_lang)
                {
                    translated = Some(fallback_text.to_string());
                    detail.stats.fallback += 1;
                }
            }

            match &translated {
                Some(text) if lang != &native => {
                    resource_rows.insert(key.clone(), text.clone());
                }
                Some(_) => {}
                None => {
                    untranslated_rows.insert(key.clone(), entry.default_value.clone());
                }
            }
        }

        // Sweep rows the scan no longer references.
        for key in project.keys() {
            if !append_mode && project.get(&key, &native).is_none() {
                project.mark_obsolete(&key);
                continue;
            }
            let in_scan = scan
                .entries()
                .get(&key)
                .is_some_and(|entry| !entry.default_value.is_empty());
            if !in_scan {
                detail.stats.unused += 1;
                detail.unused_keys.push(key.clone());
            }
            if !append_mode && !used_base_keys.contains(base_key(&key)) {
                project.mark_obsolete(&key);
            }
        }

        detail.untranslated_keys.sort();
        detail.unused_keys.sort();

        if lang != &native {
            outcome.resources.insert(lang.clone(), resource_rows);
        }
        outcome.untranslated.insert(lang.clone(), untranslated_rows);
        outcome.stats.insert(lang.clone(), detail);
    }

    outcome
}

// ============================================================
// Artifacts
// ============================================================

/// Files written for one run.
#[derive(Debug, Default)]
pub struct WrittenArtifacts {
    pub files: Vec<PathBuf>,
}

/// Write every output artifact for the run.
///
/// Resource files are only emitted for languages with at least one
/// translated row. A target language's project-source file is only written
/// when none existed before the run, so manually edited translations are
/// never clobbered.
#[allow(clippy::too_many_arguments)]
pub fn write_artifacts(
    root_dir: &Path,
    config: &Config,
    project: &TranslationProject,
    outcome: &ReconcileOutcome,
    scan: &ScanCollector,
    diagnostics: &Diagnostics,
    preexisting_langs: &HashSet<String>,
    export_untranslated: bool,
) -> Result<WrittenArtifacts> {
    let mut written = WrittenArtifacts::default();
    let output_dir = root_dir.join(&config.output);

    // Per-language resource files.
    for (lang, rows) in &outcome.resources {
        let translated = outcome
            .stats
            .get(lang)
            .map(|detail| detail.stats.translated)
            .unwrap_or(0);
        if translated == 0 {
            continue;
        }
        let path = config.resource_path(root_dir, lang);
        write_json(&path, &json!(rows))?;
        written.files.push(path);
    }

    // Project-source files, native always, targets only on first run.
    for lang in config.ordered_langs() {
        if lang != config.native_lang && preexisting_langs.contains(&lang) {
            continue;
        }
        let export = project.export(&lang);
        if export.is_empty() {
            continue;
        }
        let path = output_dir.join("source").join(format!("{lang}.json"));
        write_json(&path, &serde_json::Value::Object(export))?;
        written.files.push(path);
    }

    // Aggregated statistics.
    let stats_path = output_dir.join("stats.json");
    write_json(&stats_path, &stats_report(config, outcome, diagnostics))?;
    written.files.push(stats_path);

    // Untranslated exports on request, one file per language.
    if export_untranslated {
        for lang in config.ordered_langs() {
            let empty = BTreeMap::new();
            let rows = outcome.untranslated.get(&lang).unwrap_or(&empty);
            let path = output_dir
                .join("untranslated")
                .join(format!("{lang}.untranslated.json"));
            write_json(&path, &json!(rows))?;
            written.files.push(path);
        }
    }

    // Static-analysis context for markup-extracted entries.
    if !scan.context().is_empty() {
        let path = output_dir.join("context").join("context.json");
        write_json(&path, &json!(scan.context()))?;
        written.files.push(path);
    }

    // Advisory markdown reports.
    let advisory = [
        (
            "unmarked.md",
            diagnostics.lint_findings_where(LintKind::is_bare_text),
        ),
        (
            "hard-code-of-domain.md",
            diagnostics.lint_findings(LintKind::HardCodedDomain),
        ),
        (
            "no-string-concat.md",
            diagnostics.lint_findings(LintKind::StringConcatenation),
        ),
    ];
    for (name, findings) in advisory {
        let path = output_dir.join(name);
        if findings.is_empty() {
            // Stale reports from a previous run would be misleading.
            let _ = std::fs::remove_file(&path);
            continue;
        }
        write_text(&path, &advisory_markdown(&findings))?;
        written.files.push(path);
    }

    Ok(written)
}

/// The stats artifact: a flat summary block plus per-language detail.
pub fn stats_report(
    config: &Config,
    outcome: &ReconcileOutcome,
    diagnostics: &Diagnostics,
) -> serde_json::Value {
    let mut summary = serde_json::Map::new();

    let marked = outcome
        .stats
        .get(&config.native_lang)
        .map(|detail| detail.stats.scanned)
        .unwrap_or(0);
    summary.insert("marked".to_string(), json!(marked));
    summary.insert("unmarked".to_string(), json!(diagnostics.unmarked_count()));

    for lang in config.target_langs() {
        if let Some(detail) = outcome.stats.get(lang) {
            summary.insert(
                format!("{lang}Untranslated"),
                json!(detail.stats.untranslated),
            );
            summary.insert(
                format!("{lang}UntranslatedWords"),
                json!(detail.stats.words),
            );
        }
    }

    json!({
        "stats": summary,
        "languages": &outcome.stats,
    })
}

fn advisory_markdown(findings: &[&LintFinding]) -> String {
    findings
        .iter()
        .map(|finding| {
            let rel = finding.location.file_path.replace('\\', "/");
            format!(
                "- [{}](../{}#L{})",
                finding.text.trim(),
                rel.trim_start_matches("./"),
                finding.location.line
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn write_json(path: &Path, value: &serde_json::Value) -> Result<()> {
    let content = serde_json::to_string_pretty(value).context("Failed to serialize artifact")?;
    write_text(path, &content)
}

fn write_text(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entry::{EntrySink, TranslationEntry};

    fn collect(entries: &[(&str, &str)]) -> ScanCollector {
        let mut collector = ScanCollector::new();
        for (key, text) in entries {
            collector.emit(TranslationEntry {
                key: key.to_string(),
                default_value: text.to_string(),
                ..Default::default()
            });
        }
        collector
    }

    fn zh_en_project() -> TranslationProject {
        TranslationProject::new("zh", &["en".to_string()])
    }

    fn langs(list: &[&str]) -> Vec<String> {
        list.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn new_keys_count_untranslated_with_word_totals() {
        let mut project = zh_en_project();
        let scan = collect(&[("k_aaaa001", "问候语"), ("k_aaaa002", "再见{{name}}")]);

        let outcome = reconcile(
            &mut project,
            &scan,
            &langs(&["zh", "en"]),
            &BTreeMap::new(),
            false,
        );

        let en = &outcome.stats["en"];
        assert_eq!(en.stats.scanned, 2);
        assert_eq!(en.stats.untranslated, 2);
        assert_eq!(en.stats.translated, 0);
        // 问候语 = 3 wide units, 再见{{name}} = 2 wide + 1 narrow segment.
        assert_eq!(en.stats.words, 6);
        assert!(outcome.resources["en"].is_empty());
    }

    #[test]
    fn existing_translations_count_translated() {
        let mut project = zh_en_project();
        project.add("k_aaaa001", "zh", "问候语");
        project.add("k_aaaa001", "en", "greeting");

        let scan = collect(&[("k_aaaa001", "问候语")]);
        let outcome = reconcile(
            &mut project,
            &scan,
            &langs(&["zh", "en"]),
            &BTreeMap::new(),
            false,
        );

        let en = &outcome.stats["en"];
        assert_eq!(en.stats.translated, 1);
        assert_eq!(en.stats.untranslated, 0);
        assert_eq!(outcome.resources["en"]["k_aaaa001"], "greeting");
    }

    #[test]
    fn fallback_is_single_level_and_counted() {
        let mut project = TranslationProject::new("zh", &["en".to_string()]);
        project.add("k_aaaa001", "zh", "确认");
        project.add("k_aaaa001", "en", "confirm");

        let scan = collect(&[("k_aaaa001", "确认")]);
        let fallbacks = BTreeMap::from([("ja".to_string(), "en".to_string())]);
        let outcome = reconcile(
            &mut project,
            &scan,
            &langs(&["zh", "en", "ja"]),
            &fallbacks,
            false,
        );

        let ja = &outcome.stats["ja"];
        assert_eq!(ja.stats.untranslated, 1);
        assert_eq!(ja.stats.fallback, 1);
        assert_eq!(outcome.resources["ja"]["k_aaaa001"], "confirm");
        // Fallback text does not satisfy the untranslated export.
        assert!(outcome.untranslated["ja"].is_empty());
    }

    #[test]
    fn unused_rows_counted_and_obsoleted() {
        let mut project = zh_en_project();
        project.add("k_old0001", "zh", "旧词条");
        project.add("k_new0001", "zh", "新词条");

        let scan = collect(&[("k_new0001", "新词条")]);
        let outcome = reconcile(
            &mut project,
            &scan,
            &langs(&["zh"]),
            &BTreeMap::new(),
            false,
        );

        let zh = &outcome.stats["zh"];
        assert_eq!(zh.stats.unused, 1);
        assert_eq!(zh.unused_keys, vec!["k_old0001"]);
        assert!(project.is_obsolete("k_old0001"));
        assert!(!project.is_obsolete("k_new0001"));
    }

    #[test]
    fn empty_native_rows_obsoleted_unless_append_mode() {
        let mut project = zh_en_project();
        project.add("k_empty01", "en", "stray");

        let scan = collect(&[]);
        reconcile(
            &mut project,
            &scan,
            &langs(&["zh"]),
            &BTreeMap::new(),
            false,
        );
        assert!(project.is_obsolete("k_empty01"));

        let mut project = zh_en_project();
        project.add("k_empty01", "en", "stray");
        reconcile(
            &mut project,
            &scan,
            &langs(&["zh"]),
            &BTreeMap::new(),
            true,
        );
        assert!(!project.is_obsolete("k_empty01"));
    }

    #[test]
    fn variant_keys_protect_their_base_group() {
        let mut project = zh_en_project();
        project.add("k_fruit01", "zh", "苹果");
        project.add("k_fruit01_plural", "zh", "许多苹果");

        // Only the plural variant is still scanned; the base group survives.
        let scan = collect(&[("k_fruit01_plural", "许多苹果")]);
        reconcile(
            &mut project,
            &scan,
            &langs(&["zh"]),
            &BTreeMap::new(),
            false,
        );
        assert!(!project.is_obsolete("k_fruit01"));
        assert!(!project.is_obsolete("k_fruit01_plural"));
    }

    #[test]
    fn reconciliation_is_idempotent() {
        let mut project = zh_en_project();
        project.add("k_aaaa001", "zh", "问候语");
        project.add("k_gone001", "zh", "废弃");

        let scan = collect(&[("k_aaaa001", "问候语")]);
        let langs = langs(&["zh", "en"]);

        let first = reconcile(&mut project, &scan, &langs, &BTreeMap::new(), false);
        let first_obsolete = project.obsolete_keys();

        let second = reconcile(&mut project, &scan, &langs, &BTreeMap::new(), false);
        let second_obsolete = project.obsolete_keys();

        assert_eq!(first, second);
        assert_eq!(first_obsolete, second_obsolete);
    }

    #[test]
    fn stats_report_shape() {
        let mut project = zh_en_project();
        let scan = collect(&[("k_aaaa001", "问候语")]);
        let config = Config {
            langs: langs(&["zh", "en"]),
            fallback_langs: BTreeMap::new(),
            ..Default::default()
        };

        let outcome = reconcile(
            &mut project,
            &scan,
            &config.ordered_langs(),
            &config.fallback_langs,
            false,
        );
        let report = stats_report(&config, &outcome, &Diagnostics::new());

        assert_eq!(report["stats"]["marked"], 1);
        assert_eq!(report["stats"]["enUntranslated"], 1);
        assert_eq!(report["languages"]["en"]["untranslated"], 1);
    }
}
