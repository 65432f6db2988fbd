//! Check command implementation.

use anyhow::{bail, Context, Result};
use archcheck_core::Analyzer;
use archcheck_java::JavaParser;
use archcheck_rules::{rules_from_config, select_rules};
use std::path::Path;

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Runs the check command.
///
/// Returns `false` when error-severity violations were found.
pub fn run(
    path: &Path,
    format: OutputFormat,
    rules_filter: Option<String>,
    exclude: Vec<String>,
    source: &ConfigSource,
) -> Result<bool> {
    let config = source.load()?;

    let rules = match rules_filter.as_deref() {
        Some(filter) => {
            let names: Vec<&str> = filter
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .collect();
            let rules = select_rules(&names, &config);
            if rules.is_empty() {
                bail!("No known rules in --rules {filter}; see `archcheck list-rules`");
            }
            rules
        }
        None => rules_from_config(&config),
    };

    let mut builder = Analyzer::builder()
        .root(path)
        .config(config)
        .parser(JavaParser::new())
        .excludes(exclude);
    for rule in rules {
        builder = builder.rule_box(rule);
    }

    let mut analyzer = builder.build().context("Failed to build analyzer")?;

    tracing::info!("Analyzing {:?} with {} rules", path, analyzer.rule_count());

    let result = analyzer.analyze().context("Analysis failed")?;

    super::output::print(&result, format, analyzer.root())?;

    Ok(!result.has_errors())
}
