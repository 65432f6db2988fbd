//! Comment-based allowance directives.
//!
//! A violation is suppressed when the reported line, or the line just above
//! it, carries a directive naming the rule:
//!
//! ```text
//! // archcheck: allow(require-base-class) reason="legacy entry point"
//! public class LegacyHTMLAction {
//! ```
//!
//! `all` matches every rule.

use std::collections::BTreeSet;

const DIRECTIVE: &str = "archcheck:";

/// Result of checking for an allow directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowCheck {
    /// Rule is not allowed.
    Denied,
    /// Rule is allowed with optional reason.
    Allowed {
        /// The reason provided (if any).
        reason: Option<String>,
    },
}

impl AllowCheck {
    /// Returns true if allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Returns the reason if allowed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed { reason } => reason.as_deref(),
            Self::Denied => None,
        }
    }
}

/// Parsed allowance directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowDirective {
    /// Rule names that are allowed.
    pub rules: BTreeSet<String>,
    /// Optional reason for the allowance.
    pub reason: Option<String>,
}

impl AllowDirective {
    fn covers(&self, rule_name: &str) -> bool {
        self.rules.contains(rule_name) || self.rules.contains("all")
    }
}

/// Checks `content` for a directive allowing `rule_name` at `line` (1-indexed).
#[must_use]
pub fn check_allow(content: &str, line: usize, rule_name: &str) -> AllowCheck {
    let lines: Vec<&str> = content.lines().collect();

    for check_line in [line.saturating_sub(1), line] {
        if check_line == 0 || check_line > lines.len() {
            continue;
        }
        if let Some(directive) = parse_allow_directive(lines[check_line - 1]) {
            if directive.covers(rule_name) {
                return AllowCheck::Allowed {
                    reason: directive.reason,
                };
            }
        }
    }

    AllowCheck::Denied
}

/// Parses a directive from a source line.
///
/// The directive may follow code on the same line (`int x; // archcheck: ...`).
#[must_use]
pub fn parse_allow_directive(line: &str) -> Option<AllowDirective> {
    let comment = &line[line.find("//")? + 2..];
    let directive = comment.trim().strip_prefix(DIRECTIVE)?.trim();
    let allow_content = directive.strip_prefix("allow(")?.trim();

    let paren_end = allow_content.find(')')?;
    let rules: BTreeSet<String> = allow_content[..paren_end]
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if rules.is_empty() {
        return None;
    }

    let rest = allow_content[paren_end + 1..].trim();
    let reason = rest
        .strip_prefix("reason=")
        .map(str::trim)
        .and_then(|r| r.strip_prefix('"'))
        .and_then(|r| r.find('"').map(|end| r[..end].to_string()));

    Some(AllowDirective { rules, reason })
}
