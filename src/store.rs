//! The translation project store.
//!
//! One [`SourceRow`] per key holds the native sentence and the per-language
//! translations. Rows are durable: they are loaded from the per-language
//! project-source files, mutated by reconciliation, and marked obsolete
//! rather than deleted, so nothing is lost between runs.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::core::key::base_key;
use crate::utils::{contains_native_script, strip_whitespace};

/// One row of the translation project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRow {
    pub key: String,
    /// The sentence in the native language, as last scanned.
    pub native_string: Option<String>,
    /// Language code to translated sentence.
    pub translations: BTreeMap<String, String>,
}

impl SourceRow {
    fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Default::default()
        }
    }
}

/// In-memory translation project covering every configured language.
#[derive(Debug)]
pub struct TranslationProject {
    native_lang: String,
    /// Languages whose translated resources must never contain
    /// native-script characters.
    script_free_langs: Vec<String>,
    rows: BTreeMap<String, SourceRow>,
    /// Base keys excluded from export. Never blocks re-adding a key.
    obsolete: HashSet<String>,
}

impl TranslationProject {
    pub fn new(native_lang: &str, script_free_langs: &[String]) -> Self {
        Self {
            native_lang: native_lang.to_string(),
            script_free_langs: script_free_langs.to_vec(),
            rows: BTreeMap::new(),
            obsolete: HashSet::new(),
        }
    }

    pub fn native_lang(&self) -> &str {
        &self.native_lang
    }

    pub fn keys(&self) -> Vec<String> {
        self.rows.keys().cloned().collect()
    }

    /// Load a persisted project-source file (`<dir>/<lang>.json`).
    ///
    /// Values in a project-source file are taken at face value, with one
    /// exception: a script-free language containing native-script text is an
    /// untranslated sentence masquerading as translated, and poisons every
    /// artifact derived from it. That is a fatal error.
    pub fn load(&mut self, source_dir: &Path, lang: &str) -> Result<()> {
        let path = source_dir.join(format!("{lang}.json"));
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read project source {}", path.display()))?;
        let data: serde_json::Map<String, Value> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse project source {}", path.display()))?;

        for (key, value) in data {
            let Some(text) = value.as_str() else { continue };
            if lang == self.native_lang {
                let row = self
                    .rows
                    .entry(key.clone())
                    .or_insert_with(|| SourceRow::new(&key));
                row.native_string = Some(text.to_string());
                continue;
            }

            let has_native = self.get(&key, &self.native_lang).is_some();
            if text.is_empty() || !has_native {
                continue;
            }
            if self.script_free_langs.iter().any(|l| l == lang) && contains_native_script(text) {
                bail!(
                    "native-script text found in {}.json for key {}: \"{}\" - check the translation file",
                    lang,
                    key,
                    text
                );
            }
            let row = self
                .rows
                .entry(key.clone())
                .or_insert_with(|| SourceRow::new(&key));
            row.translations.insert(lang.to_string(), text.to_string());
        }

        Ok(())
    }

    /// Seed the project from a legacy flat resource file when no
    /// project-source file exists yet for the language. A missing file is
    /// fine; this is a best-effort bootstrap.
    pub fn bootstrap(&mut self, resource_path: &Path, lang: &str) -> Result<()> {
        let content = match std::fs::read_to_string(resource_path) {
            Ok(content) => content,
            Err(_) => return Ok(()),
        };
        let data: serde_json::Map<String, Value> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse resource {}", resource_path.display()))?;

        for (key, value) in data {
            if let Some(text) = value.as_str() {
                self.add(&key, lang, text);
            }
        }
        Ok(())
    }

    /// Record a sentence for a key in a language, creating the row on first
    /// reference. A translation identical to the native sentence (under
    /// whitespace removal) is not a translation and is never stored.
    pub fn add(&mut self, key: &str, lang: &str, text: &str) {
        let native = self.get(key, &self.native_lang).map(str::to_owned);
        let is_native = lang == self.native_lang;

        let row = self
            .rows
            .entry(key.to_string())
            .or_insert_with(|| SourceRow::new(key));

        if is_native {
            row.native_string = Some(text.to_string());
            return;
        }

        if text.is_empty() {
            return;
        }
        if let Some(native) = native
            && strip_whitespace(text) != strip_whitespace(&native)
        {
            row.translations.insert(lang.to_string(), text.to_string());
        }
    }

    /// Look up the stored sentence for a key in a language.
    ///
    /// For the native language, a missing or empty sentence falls back to
    /// the base key and its `_0` plural variant, because translated keys may
    /// carry context or plural suffixes the scan never produced directly.
    /// Non-native languages have no implicit fallback here; fallback chains
    /// are reconciliation's business.
    pub fn get(&self, key: &str, lang: &str) -> Option<&str> {
        let row = self.rows.get(key)?;
        if lang == self.native_lang {
            return row
                .native_string
                .as_deref()
                .filter(|s| !s.is_empty())
                .or_else(|| self.find_native_variant(key));
        }
        row.translations.get(lang).map(String::as_str)
    }

    fn find_native_variant(&self, key: &str) -> Option<&str> {
        let base = base_key(key);
        for candidate in [base.to_string(), format!("{base}_0")] {
            if let Some(row) = self.rows.get(&candidate)
                && let Some(native) = row.native_string.as_deref().filter(|s| !s.is_empty())
            {
                return Some(native);
            }
        }
        None
    }

    /// Mark a key's whole variant group as obsolete. Cumulative and
    /// idempotent; the rows stay in memory and `add` still works.
    pub fn mark_obsolete(&mut self, key: &str) {
        self.obsolete.insert(base_key(key).to_string());
    }

    pub fn is_obsolete(&self, key: &str) -> bool {
        self.obsolete.contains(base_key(key))
    }

    pub fn obsolete_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.obsolete.iter().cloned().collect();
        keys.sort();
        keys
    }

    /// All exportable rows for a language, sorted by key, skipping obsolete
    /// groups and rows without a value in that language.
    pub fn export(&self, lang: &str) -> serde_json::Map<String, Value> {
        let mut out = serde_json::Map::new();
        for key in self.rows.keys() {
            if self.is_obsolete(key) {
                continue;
            }
            if let Some(value) = self.get(key, lang) {
                out.insert(key.clone(), Value::String(value.to_string()));
            }
        }
        out
    }

    /// Serialized project-source content for a language.
    pub fn output(&self, lang: &str) -> Result<String> {
        serde_json::to_string_pretty(&self.export(lang))
            .context("Failed to serialize project source")
    }
}
