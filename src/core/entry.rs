//! Translation entry types and the sink the extractors emit into.

use std::collections::BTreeMap;

use serde::Serialize;

/// One discovered occurrence of translatable text.
///
/// Entries are ephemeral: they live for a single scan run and are folded
/// into the translation project by reconciliation. Many occurrences may
/// share a key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationEntry {
    /// Stable key. Empty until derived (markup entries derive lazily, at
    /// emission time, because the default text is only complete then).
    pub key: String,
    /// The native-language sentence.
    pub default_value: String,
    /// Plural form of the sentence, when given explicitly.
    pub default_value_plural: Option<String>,
    /// Disambiguation context appended to the registry slot.
    pub context: Option<String>,
    /// Plural count. Presence (not value) triggers plural variant keys.
    pub count: Option<f64>,
    pub namespace: Option<String>,
    pub key_separator: Option<String>,
    pub ns_separator: Option<String>,
    /// Enclosing markup element names plus the nearest named declaration,
    /// outermost first. Empty for plain invocation matches.
    pub component_stack: Vec<String>,
}

/// Where extractors deliver entries.
///
/// Both the raw-text invocation extractor and the markup extractor emit
/// through this one interface, so a downstream consumer (the scan collector,
/// or a test inspector) never cares which extractor found an entry.
pub trait EntrySink {
    fn emit(&mut self, entry: TranslationEntry);
}

/// Static-analysis context recorded alongside markup-extracted entries.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EntryContext {
    pub raw_text: String,
    pub component_stack: Vec<String>,
}

/// Default sink: folds entries into a per-run key set.
///
/// The first occurrence of a key wins; later occurrences of the same key are
/// kept only in the context table when they carry a richer component stack.
/// Keys iterate in sorted order so downstream output is reproducible.
#[derive(Debug, Default)]
pub struct ScanCollector {
    entries: BTreeMap<String, TranslationEntry>,
    context: BTreeMap<String, EntryContext>,
}

impl ScanCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &BTreeMap<String, TranslationEntry> {
        &self.entries
    }

    pub fn context(&self) -> &BTreeMap<String, EntryContext> {
        &self.context
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, key: String, entry: TranslationEntry) {
        if !entry.component_stack.is_empty() {
            self.context.entry(key.clone()).or_insert_with(|| EntryContext {
                raw_text: entry.default_value.clone(),
                component_stack: entry.component_stack.clone(),
            });
        }
        self.entries.entry(key).or_insert(entry);
    }
}

impl EntrySink for ScanCollector {
    fn emit(&mut self, entry: TranslationEntry) {
        // A counted sentence also registers its plural variant so the
        // translation project sees every key the runtime may ask for.
        if entry.count.is_some() {
            let mut plural = entry.clone();
            plural.key = format!("{}_plural", entry.key);
            plural.default_value = entry
                .default_value_plural
                .clone()
                .unwrap_or_else(|| entry.default_value.clone());
            self.insert(plural.key.clone(), plural);
        }
        self.insert(entry.key.clone(), entry);
    }
}
