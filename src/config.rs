use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = ".sicklerc.json";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub ignores: Vec<String>,
    #[serde(default = "default_includes")]
    pub includes: Vec<String>,
    /// Translation function names matched by the call scanner.
    #[serde(default = "default_func_list")]
    pub func_list: Vec<String>,
    /// Name of the translated-markup component.
    #[serde(default = "default_trans_component")]
    pub trans_component: String,
    /// Attribute carrying an explicit key on the markup component.
    #[serde(default = "default_key_attr")]
    pub key_attr: String,
    /// Attribute carrying explicit default text on the markup component.
    #[serde(default = "default_defaults_attr")]
    pub defaults_attr: String,
    /// The language the source tree is written in.
    #[serde(default = "default_native_lang")]
    pub native_lang: String,
    /// Every language the project maintains, native included.
    #[serde(default = "default_langs")]
    pub langs: Vec<String>,
    /// One-level fallback language per target language.
    #[serde(default = "default_fallback_langs")]
    pub fallback_langs: BTreeMap<String, String>,
    /// Languages whose persisted resources must not contain native-script
    /// characters.
    #[serde(default = "default_script_free_langs")]
    pub script_free_langs: Vec<String>,
    /// Project directory holding sources, stats and advisory reports.
    #[serde(default = "default_output")]
    pub output: String,
    /// Per-language resource file path; `{{lng}}` is replaced.
    #[serde(default = "default_resource_save_path")]
    pub resource_save_path: String,
    /// Advisory pattern for hard-coded domains.
    #[serde(default = "default_domain_pattern")]
    pub domain_pattern: String,
    /// Keep existing rows even when the current scan no longer uses them.
    #[serde(default)]
    pub append_mode: bool,
}

fn default_includes() -> Vec<String> {
    vec!["src".to_string()]
}

fn default_func_list() -> Vec<String> {
    ["t", "i18n.t", "i18next.t"].map(String::from).to_vec()
}

fn default_trans_component() -> String {
    "Trans".to_string()
}

fn default_key_attr() -> String {
    "i18nKey".to_string()
}

fn default_defaults_attr() -> String {
    "defaults".to_string()
}

fn default_native_lang() -> String {
    "zh".to_string()
}

fn default_langs() -> Vec<String> {
    ["zh", "en", "ja", "ko"].map(String::from).to_vec()
}

fn default_fallback_langs() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("ja".to_string(), "en".to_string()),
        ("ko".to_string(), "en".to_string()),
    ])
}

fn default_script_free_langs() -> Vec<String> {
    vec!["en".to_string()]
}

fn default_output() -> String {
    "i18n".to_string()
}

fn default_resource_save_path() -> String {
    "i18n/translation/{{lng}}.json".to_string()
}

fn default_domain_pattern() -> String {
    r"(?i)(?:https?:)?//[a-z0-9.-]+\.(?:com|cn|net|org)".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignores: Vec::new(),
            includes: default_includes(),
            func_list: default_func_list(),
            trans_component: default_trans_component(),
            key_attr: default_key_attr(),
            defaults_attr: default_defaults_attr(),
            native_lang: default_native_lang(),
            langs: default_langs(),
            fallback_langs: default_fallback_langs(),
            script_free_langs: default_script_free_langs(),
            output: default_output(),
            resource_save_path: default_resource_save_path(),
            domain_pattern: default_domain_pattern(),
            append_mode: false,
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error if a glob pattern, the domain pattern, or the
    /// language setup is unusable.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        // Include patterns without wildcards are literal directory paths.
        for pattern in &self.includes {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'includes': \"{}\"", pattern)
                })?;
            }
        }

        Regex::new(&self.domain_pattern)
            .with_context(|| format!("Invalid 'domainPattern': \"{}\"", self.domain_pattern))?;

        if !self.langs.iter().any(|l| l == &self.native_lang) {
            anyhow::bail!(
                "'langs' must contain the native language \"{}\"",
                self.native_lang
            );
        }

        Ok(())
    }

    /// Languages other than the native one, in configured order.
    pub fn target_langs(&self) -> Vec<&str> {
        self.langs
            .iter()
            .filter(|l| *l != &self.native_lang)
            .map(String::as_str)
            .collect()
    }

    /// All languages with the native one first, preserving configured order
    /// otherwise. Reconciliation relies on the native pass running first.
    pub fn ordered_langs(&self) -> Vec<String> {
        let mut ordered = vec![self.native_lang.clone()];
        for lang in &self.langs {
            if lang != &self.native_lang {
                ordered.push(lang.clone());
            }
        }
        ordered
    }

    /// Resolved resource file path for a language, relative to the root.
    pub fn resource_path(&self, root: &Path, lang: &str) -> PathBuf {
        root.join(self.resource_save_path.replace("{{lng}}", lang))
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use tempfile::tempdir;

    use crate::config::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.ignores.is_empty());
        assert_eq!(config.native_lang, "zh");
        assert!(config.langs.contains(&"en".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "funcList": ["tr"],
            "transComponent": "Translate",
            "langs": ["zh", "en"],
            "fallbackLangs": { "ja": "en" }
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.func_list, vec!["tr"]);
        assert_eq!(config.trans_component, "Translate");
        assert_eq!(config.langs, vec!["zh", "en"]);
        assert_eq!(config.fallback_langs.get("ja").map(String::as_str), Some("en"));
        // Unset fields keep defaults.
        assert_eq!(config.key_attr, "i18nKey");
    }

    #[test]
    fn test_find_config_file() {
        let dir = tempdir().unwrap();
        let sub_dir = dir.path().join("src").join("components");
        fs::create_dir_all(&sub_dir).unwrap();

        let config_path = dir.path().join(CONFIG_FILE_NAME);
        File::create(&config_path).unwrap();

        let found = find_config_file(&sub_dir);
        assert!(found.is_some());
        assert_eq!(found.unwrap(), config_path);
    }

    #[test]
    fn test_find_config_not_found() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        let found = find_config_file(dir.path());
        assert!(found.is_none());
    }

    #[test]
    fn test_validate_invalid_ignore_pattern() {
        let config = Config {
            ignores: vec!["[invalid".to_string()],
            ..Default::default()
        };
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("ignores"));
    }

    #[test]
    fn test_validate_native_lang_must_be_listed() {
        let config = Config {
            langs: vec!["en".to_string(), "ja".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ordered_langs_native_first() {
        let config = Config {
            langs: ["en", "ja", "zh"].map(String::from).to_vec(),
            ..Default::default()
        };
        assert_eq!(config.ordered_langs(), vec!["zh", "en", "ja"]);
    }

    #[test]
    fn test_resource_path_substitution() {
        let config = Config::default();
        let path = config.resource_path(Path::new("/app"), "en");
        assert_eq!(path, PathBuf::from("/app/i18n/translation/en.json"));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        fs::write(&config_path, r#"{ "ignores": ["**/test/**"] }"#).unwrap();

        let result = load_config(dir.path()).unwrap();
        assert!(result.from_file);
        assert_eq!(result.config.ignores, vec!["**/test/**"]);
    }

    #[test]
    fn test_load_config_default_when_not_found() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        let result = load_config(dir.path()).unwrap();
        assert!(!result.from_file);
        assert_eq!(result.config.includes, vec!["src"]);
    }
}
