//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# archcheck configuration

[analyzer]
# Root directory to analyze (default: current directory)
# root = "./src/main/java"

# Glob patterns to exclude from analysis
exclude = [
    "**/target/**",
    "**/build/**",
    "**/generated/**",
]

# Files in these packages (or beneath them) are skipped entirely
ignore_packages = []

# Respect .gitignore files
respect_gitignore = true

# Rule configurations
# Each rule can be enabled/disabled and have its severity overridden

[rules.require-base-class]
enabled = true
suffix = "HTMLAction"
base_class = "HTMLActionSupport"
# exempt_annotation = "Deprecated"
# ignore_inner_classes = false

[rules.forbidden-dependency]
enabled = true
from = "com.sun.j2ee.blueprints.processmanager"
to = "com.sun.j2ee.blueprints.opc"
# message = "Classes in processmanager should not call classes in opc."

[rules.no-parameter-reassignment]
enabled = true
# severity = "error"
"#;

/// Runs the init command in the current directory.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new("archcheck.toml"), force)?;

    println!("Created archcheck.toml");
    println!("\nNext steps:");
    println!("  1. Edit archcheck.toml to configure rules");
    println!("  2. Run: archcheck check");

    Ok(())
}

fn write_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }
    std::fs::write(config_path, DEFAULT_CONFIG)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use archcheck_core::Config;
    use tempfile::TempDir;

    #[test]
    fn default_config_is_valid() {
        let config = Config::parse(DEFAULT_CONFIG).expect("template parses");
        assert_eq!(config.rules.len(), 3);
        assert_eq!(archcheck_rules::rules_from_config(&config).len(), 3);
        assert!(config.analyzer.respect_gitignore);
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("archcheck.toml");
        std::fs::write(&path, "# mine").expect("write");

        assert!(write_config(&path, false).is_err());
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "# mine");

        write_config(&path, true).expect("forced write");
        assert_eq!(
            std::fs::read_to_string(&path).expect("read"),
            DEFAULT_CONFIG
        );
    }
}
