//! Configuration file resolution with global fallback.
//!
//! The configuration file is looked up in this order:
//!
//! 1. `--config` flag (explicit path)
//! 2. `{project}/archcheck.toml` or `{project}/.archcheck.toml`
//! 3. `~/.archcheck/config.toml`, or `$ARCHCHECK_CONFIG_DIR/config.toml`
//! 4. No file: built-in defaults

use anyhow::{Context, Result};
use archcheck_core::Config;
use std::path::{Path, PathBuf};

/// Project-level config file names, checked in order.
const PROJECT_CONFIG_NAMES: &[&str] = &["archcheck.toml", ".archcheck.toml"];

/// Config file name within the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Environment variable overriding the global config directory.
const CONFIG_DIR_ENV: &str = "ARCHCHECK_CONFIG_DIR";

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found in the analyzed project directory.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Reads the configuration this source points at.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load(&self) -> Result<Config> {
        let Some(path) = self.path() else {
            tracing::debug!("No configuration file found, using defaults");
            return Ok(Config::default());
        };
        if matches!(self, Self::Global(_)) {
            tracing::info!("Using global config: {}", path.display());
        }
        Config::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))
    }
}

/// Resolves the configuration file for `project_dir`.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_in(project_dir, explicit, global_config_dir())
}

/// Resolution with the global directory passed in, so tests need no env vars.
fn resolve_in(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    if let Some(path) = PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|candidate| candidate.is_file())
    {
        return ConfigSource::Project(path);
    }

    global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
        .filter(|candidate| candidate.is_file())
        .map_or(ConfigSource::Default, ConfigSource::Global)
}

/// Returns the global config directory: `$ARCHCHECK_CONFIG_DIR`, else
/// `~/.archcheck`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".archcheck"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path, content: &str) {
        fs::write(path, content).expect("write config");
    }

    #[test]
    fn explicit_path_wins_without_existence_check() {
        let project = TempDir::new().expect("tempdir");
        touch(&project.path().join("archcheck.toml"), "");

        let explicit = Path::new("/nonexistent/custom.toml");
        assert_eq!(
            resolve_in(project.path(), Some(explicit), None),
            ConfigSource::Explicit(explicit.to_path_buf())
        );
    }

    #[test]
    fn project_names_are_checked_in_order() {
        let project = TempDir::new().expect("tempdir");
        touch(&project.path().join(".archcheck.toml"), "");
        assert_eq!(
            resolve_in(project.path(), None, None),
            ConfigSource::Project(project.path().join(".archcheck.toml"))
        );

        touch(&project.path().join("archcheck.toml"), "");
        assert_eq!(
            resolve_in(project.path(), None, None),
            ConfigSource::Project(project.path().join("archcheck.toml"))
        );
    }

    #[test]
    fn global_is_the_fallback() {
        let project = TempDir::new().expect("tempdir");
        let global = TempDir::new().expect("tempdir");

        assert_eq!(
            resolve_in(project.path(), None, Some(global.path().to_path_buf())),
            ConfigSource::Default,
            "global dir without config.toml"
        );

        touch(&global.path().join("config.toml"), "");
        assert_eq!(
            resolve_in(project.path(), None, Some(global.path().to_path_buf())),
            ConfigSource::Global(global.path().join("config.toml"))
        );

        touch(&project.path().join("archcheck.toml"), "");
        assert!(matches!(
            resolve_in(project.path(), None, Some(global.path().to_path_buf())),
            ConfigSource::Project(_)
        ));
    }

    #[test]
    fn load_reads_resolved_file() {
        let project = TempDir::new().expect("tempdir");
        touch(
            &project.path().join("archcheck.toml"),
            "[rules.require-base-class]\nenabled = false\n",
        );
        let config = resolve_in(project.path(), None, None)
            .load()
            .expect("valid config");
        assert!(!config.is_rule_enabled("require-base-class"));
        assert!(config.is_rule_enabled("forbidden-dependency"));
    }

    #[test]
    fn load_reports_missing_and_invalid_files() {
        let project = TempDir::new().expect("tempdir");
        let missing = ConfigSource::Explicit(project.path().join("missing.toml"));
        let err = missing.load().expect_err("missing file");
        assert!(err.to_string().contains("missing.toml"));

        let broken = project.path().join("broken.toml");
        touch(&broken, "[rules\n");
        assert!(ConfigSource::Explicit(broken).load().is_err());

        assert!(ConfigSource::Default.load().is_ok());
    }
}
