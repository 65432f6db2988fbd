//! Rule trait and the per-file walker that drives it.

use crate::allowance::check_allow;
use crate::context::FileContext;
use crate::query::QueryError;
use crate::tree::{Node, NodeKind, SyntaxTree};
use crate::types::{Location, Severity, Suggestion, Violation};
use tracing::{debug, warn};

/// A rule that inspects selected node kinds of every analyzed file.
///
/// The walker calls [`begin_file`](Rule::begin_file) before the first node
/// of each file, then [`visit`](Rule::visit) once per node whose kind is
/// listed in [`interests`](Rule::interests), in source order. One instance
/// sees many files in sequence, so any per-file state must be cleared in
/// `begin_file`.
///
/// # Example
///
/// ```
/// use archcheck_core::{FileContext, Node, NodeKind, QueryError, Reporter, Rule};
///
/// struct NoStarImports;
///
/// impl Rule for NoStarImports {
///     fn name(&self) -> &'static str { "no-star-imports" }
///     fn code(&self) -> &'static str { "X001" }
///     fn interests(&self) -> &'static [NodeKind] { &[NodeKind::Import] }
///     fn begin_file(&mut self, _ctx: &FileContext<'_>) {}
///
///     fn visit(&mut self, node: Node<'_>, report: &mut Reporter) -> Result<(), QueryError> {
///         if archcheck_core::qualified_name(node)?.ends_with(".*") {
///             report.report(node.line(), "Wildcard import");
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Rule: Send {
    /// Returns the kebab-case name of this rule (e.g., "require-base-class").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "AC001").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Node kinds this rule wants to visit.
    fn interests(&self) -> &'static [NodeKind];

    /// Resets per-file state. Called before the first node of every file.
    fn begin_file(&mut self, ctx: &FileContext<'_>);

    /// Inspects one node of interest.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] when a query is handed a node it does not
    /// accept. The walker logs it and moves on to the next node.
    fn visit(&mut self, node: Node<'_>, report: &mut Reporter) -> Result<(), QueryError>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Finding {
    line: usize,
    message: String,
    help: Option<String>,
}

/// Collects `(line, message)` findings from a rule.
#[derive(Debug, Default)]
pub struct Reporter {
    findings: Vec<Finding>,
}

impl Reporter {
    /// Creates an empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation at `line`.
    pub fn report(&mut self, line: usize, message: impl Into<String>) {
        self.findings.push(Finding {
            line,
            message: message.into(),
            help: None,
        });
    }

    /// Records a violation with a fix hint.
    pub fn report_with_help(
        &mut self,
        line: usize,
        message: impl Into<String>,
        help: impl Into<String>,
    ) {
        self.findings.push(Finding {
            line,
            message: message.into(),
            help: Some(help.into()),
        });
    }

    /// Number of findings recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// Returns true if nothing was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Reported `(line, message)` pairs in report order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &str)> {
        self.findings.iter().map(|f| (f.line, f.message.as_str()))
    }

    fn into_violations(self, rule: &dyn Rule, ctx: &FileContext<'_>) -> Vec<Violation> {
        let mut violations = Vec::with_capacity(self.findings.len());
        for finding in self.findings {
            let allow = check_allow(ctx.content, finding.line, rule.name());
            if allow.is_allowed() {
                debug!(
                    rule = rule.name(),
                    line = finding.line,
                    reason = allow.reason().unwrap_or_default(),
                    "violation allowed by directive"
                );
                continue;
            }

            let location = Location::new(ctx.relative_path.clone(), finding.line, 1).with_span(
                ctx.offset_for(finding.line, 1),
                ctx.line_length(finding.line),
            );
            let mut violation = Violation::new(
                rule.code(),
                rule.name(),
                rule.default_severity(),
                location,
                finding.message,
            );
            if let Some(help) = finding.help {
                violation = violation.with_suggestion(Suggestion::new(help));
            }
            violations.push(violation);
        }
        violations
    }
}

/// Outcome of walking one file.
#[derive(Debug, Default)]
pub struct FileReport {
    /// Violations that survived allow directives, grouped by rule.
    pub violations: Vec<Violation>,
    /// Number of visits that ended in a [`QueryError`].
    pub failures: usize,
}

/// Runs `rules` over `tree` in pre-order, root included.
///
/// Each rule gets `begin_file` first, then only the nodes it declared an
/// interest in. A failed visit is logged and counted; other visits continue.
pub fn walk(tree: &SyntaxTree, ctx: &FileContext<'_>, rules: &mut [RuleBox]) -> FileReport {
    for rule in rules.iter_mut() {
        rule.begin_file(ctx);
    }

    let mut reporters: Vec<Reporter> = rules.iter().map(|_| Reporter::new()).collect();
    let mut failures = 0;

    let root = tree.root();
    for node in std::iter::once(root).chain(root.descendants()) {
        for (rule, reporter) in rules.iter_mut().zip(reporters.iter_mut()) {
            if !rule.interests().contains(&node.kind()) {
                continue;
            }
            if let Err(e) = rule.visit(node, reporter) {
                warn!(
                    rule = rule.name(),
                    file = %ctx.relative_path.display(),
                    "{e}"
                );
                failures += 1;
            }
        }
    }

    let mut violations = Vec::new();
    for (rule, reporter) in rules.iter().zip(reporters) {
        violations.extend(reporter.into_violations(rule.as_ref(), ctx));
    }

    FileReport {
        violations,
        failures,
    }
}
