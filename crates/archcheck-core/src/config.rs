//! Configuration types for archcheck.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Top-level configuration, usually read from `archcheck.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Per-rule configurations, keyed by rule name.
    #[serde(default)]
    pub rules: BTreeMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a rule is enabled. Rules without a section are enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rules
            .get(rule_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, rule_name: &str) -> Option<crate::Severity> {
        self.rules.get(rule_name).and_then(|c| c.severity)
    }

    /// Gets the options section for a rule.
    #[must_use]
    pub fn rule(&self, rule_name: &str) -> Option<&RuleConfig> {
        self.rules.get(rule_name)
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Root directory to analyze (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns to exclude from analysis.
    #[serde(default = "default_excludes")]
    pub exclude: Vec<String>,

    /// Packages whose files are skipped entirely. A file is skipped when its
    /// package equals one of these or lies beneath it.
    #[serde(default)]
    pub ignore_packages: Vec<String>,

    /// Whether to respect .gitignore files during discovery.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: default_excludes(),
            ignore_packages: Vec::new(),
            respect_gitignore: true,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_excludes() -> Vec<String> {
    vec!["**/target/**".to_string(), "**/build/**".to_string()]
}

fn default_true() -> bool {
    true
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<crate::Severity>,

    /// Rule-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: BTreeMap<String, toml::Value>,
}

impl RuleConfig {
    /// Gets an option value as a specific type.
    #[must_use]
    pub fn get_option<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.options
            .get(key)
            .and_then(|v| v.clone().try_into().ok())
    }

    /// Gets a boolean option with a default value.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.options
            .get(key)
            .and_then(toml::Value::as_bool)
            .unwrap_or(default)
    }

    /// Gets a string option with a default value.
    #[must_use]
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.options
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or(default)
    }

    /// Gets a string array option.
    #[must_use]
    pub fn get_str_array(&self, key: &str) -> Vec<String> {
        self.options
            .get(key)
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Severity;

    #[test]
    fn default_config_enables_everything() {
        let config = Config::default();
        assert!(config.analyzer.respect_gitignore);
        assert!(config.analyzer.ignore_packages.is_empty());
        assert!(config.rules.is_empty());
        assert!(config.is_rule_enabled("require-base-class"));
    }

    #[test]
    fn parses_rule_sections_and_options() {
        let toml = r#"
[analyzer]
root = "./src"
exclude = ["**/generated/**"]
ignore_packages = ["br.gov.tcu.contas"]

[rules.require-base-class]
severity = "warning"
suffix = "Action"
ignore_inner_classes = true

[rules.forbidden-dependency]
enabled = false
from = "a.b.processmanager"
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.analyzer.root, PathBuf::from("./src"));
        assert_eq!(config.analyzer.exclude, vec!["**/generated/**"]);
        assert_eq!(config.analyzer.ignore_packages, vec!["br.gov.tcu.contas"]);

        assert!(config.is_rule_enabled("require-base-class"));
        assert!(!config.is_rule_enabled("forbidden-dependency"));
        assert_eq!(
            config.rule_severity("require-base-class"),
            Some(Severity::Warning)
        );

        let rule = config.rule("require-base-class").expect("section");
        assert_eq!(rule.get_str("suffix", "HTMLAction"), "Action");
        assert_eq!(rule.get_str("base_class", "HTMLActionSupport"), "HTMLActionSupport");
        assert!(rule.get_bool("ignore_inner_classes", false));
        assert_eq!(rule.get_option::<bool>("ignore_inner_classes"), Some(true));
    }

    #[test]
    fn reads_string_arrays() {
        let config = Config::parse(
            r#"
[rules.forbidden-dependency]
extra = ["a", 1, "b"]
"#,
        )
        .expect("Failed to parse");
        let rule = config.rule("forbidden-dependency").expect("section");
        assert_eq!(rule.get_str_array("extra"), vec!["a", "b"]);
        assert!(rule.get_str_array("missing").is_empty());
    }

    #[test]
    fn rejects_invalid_toml() {
        assert!(matches!(
            Config::parse("[analyzer\nroot = 1"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn from_file_reports_missing_path() {
        let err = Config::from_file(Path::new("/nonexistent/archcheck.toml"))
            .expect_err("missing file");
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
