//! Shared output formatting for lint results.

use anyhow::Result;
use archcheck_core::{LintResult, Severity, ViolationDiagnostic};
use miette::{NamedSource, Report};
use std::fmt::Write;
use std::path::Path;

use crate::OutputFormat;

/// Print lint results in the specified format.
///
/// `root` is the analyzed directory; pretty output reads sources from it.
pub fn print(result: &LintResult, format: OutputFormat, root: &Path) -> Result<()> {
    print!("{}", render(result, format, root)?);
    Ok(())
}

/// Renders lint results without printing them.
pub fn render(result: &LintResult, format: OutputFormat, root: &Path) -> Result<String> {
    let out = match format {
        OutputFormat::Text => render_text(result),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(result)?;
            json.push('\n');
            json
        }
        OutputFormat::Compact => render_compact(result),
        OutputFormat::Pretty => render_pretty(result, root),
    };
    Ok(out)
}

fn summary(result: &LintResult) -> String {
    let (errors, warnings, infos) = result.count_by_severity();
    let color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    let mut line = format!(
        "{color}Found {errors} error(s), {warnings} warning(s), {infos} info(s) in {} file(s)",
        result.files_checked
    );
    if result.rule_failures > 0 {
        let _ = write!(line, " ({} rule visit(s) failed)", result.rule_failures);
    }
    line.push_str("\x1b[0m\n");
    line
}

fn render_text(result: &LintResult) -> String {
    let mut out = String::new();
    for violation in &result.violations {
        let severity = match violation.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
            Severity::Info => "\x1b[34minfo\x1b[0m",
        };

        let _ = writeln!(
            out,
            "{} {} at {}:{}:{}",
            violation.code,
            violation.rule,
            violation.location.file.display(),
            violation.location.line,
            violation.location.column,
        );
        let _ = writeln!(out, "  {severity}: {}", violation.message);
        if let Some(suggestion) = &violation.suggestion {
            let _ = writeln!(out, "  = help: {}", suggestion.message);
        }
        out.push('\n');
    }
    out.push_str(&summary(result));
    out
}

fn render_compact(result: &LintResult) -> String {
    let mut out = String::new();
    for violation in &result.violations {
        let _ = writeln!(out, "{violation}");
    }
    out
}

fn render_pretty(result: &LintResult, root: &Path) -> String {
    let mut out = String::new();
    for violation in &result.violations {
        let diagnostic = ViolationDiagnostic::from(violation);
        let file = &violation.location.file;
        let report = match std::fs::read_to_string(root.join(file)) {
            Ok(content) => Report::new(diagnostic)
                .with_source_code(NamedSource::new(file.display().to_string(), content)),
            Err(e) => {
                tracing::debug!("No source for {}: {e}", file.display());
                Report::new(diagnostic)
            }
        };
        let _ = writeln!(out, "{report:?}");
    }
    out.push_str(&summary(result));
    out
}
