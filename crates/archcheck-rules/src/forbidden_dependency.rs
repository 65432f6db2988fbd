//! Rule forbidding imports from one package tree into another.
//!
//! # Detected Patterns
//!
//! With `from = "a.b.processmanager"` and `to = "a.b.opc"`:
//!
//! ```java
//! package a.b.processmanager.sub;
//! import a.b.opc.Thing;        // violation
//! import a.b.other.Thing;      // ok
//! ```
//!
//! Package prefixes match whole segments: `a.b.opc` covers `a.b.opc` and
//! `a.b.opc.x` but not `a.b.opcx`.
//!
//! # Configuration
//!
//! - `from`: package prefix whose files are restricted
//! - `to`: package prefix those files may not import
//! - `message`: violation message

use archcheck_core::{
    package_matches, qualified_name, FileContext, Node, NodeKind, QueryError, Reporter, Rule,
    RuleConfig, Severity,
};
use tracing::trace;

/// Rule code for forbidden-dependency.
pub const CODE: &str = "AC002";

/// Rule name for forbidden-dependency.
pub const NAME: &str = "forbidden-dependency";

const DEFAULT_FROM: &str = "com.sun.j2ee.blueprints.processmanager";
const DEFAULT_TO: &str = "com.sun.j2ee.blueprints.opc";

/// Default violation message.
pub const DEFAULT_MESSAGE: &str = "Classes in processmanager should not call classes in opc.";

/// Forbids files in the `from` package tree from importing the `to` tree.
#[derive(Debug, Clone)]
pub struct ForbiddenDependency {
    from: String,
    to: String,
    message: String,
    severity: Severity,
    in_restricted_package: bool,
}

impl Default for ForbiddenDependency {
    fn default() -> Self {
        Self::new()
    }
}

impl ForbiddenDependency {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            from: DEFAULT_FROM.to_string(),
            to: DEFAULT_TO.to_string(),
            message: DEFAULT_MESSAGE.to_string(),
            severity: Severity::Error,
            in_restricted_package: false,
        }
    }

    /// Builds the rule from its `[rules.forbidden-dependency]` section.
    #[must_use]
    pub fn from_config(config: &RuleConfig) -> Self {
        Self::new()
            .from_package(config.get_str("from", DEFAULT_FROM))
            .to_package(config.get_str("to", DEFAULT_TO))
            .message(config.get_str("message", DEFAULT_MESSAGE))
    }

    /// Sets the restricted source package prefix.
    #[must_use]
    pub fn from_package(mut self, prefix: impl Into<String>) -> Self {
        self.from = prefix.into();
        self
    }

    /// Sets the forbidden target package prefix.
    #[must_use]
    pub fn to_package(mut self, prefix: impl Into<String>) -> Self {
        self.to = prefix.into();
        self
    }

    /// Overrides the violation message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for ForbiddenDependency {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids imports from one package tree into another"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn interests(&self) -> &'static [NodeKind] {
        &[NodeKind::PackageDef, NodeKind::Import, NodeKind::StaticImport]
    }

    fn begin_file(&mut self, _ctx: &FileContext<'_>) {
        self.in_restricted_package = false;
    }

    fn visit(&mut self, node: Node<'_>, report: &mut Reporter) -> Result<(), QueryError> {
        let name = qualified_name(node)?;

        if node.kind() == NodeKind::PackageDef {
            self.in_restricted_package = package_matches(&name, &self.from);
            trace!(package = %name, restricted = self.in_restricted_package);
            return Ok(());
        }

        if self.in_restricted_package && package_matches(&name, &self.to) {
            report.report(node.line(), self.message.as_str());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archcheck_core::{SyntaxTree, TreeBuilder};
    use std::path::Path;

    fn file(package: Option<&str>, imports: &[&str]) -> SyntaxTree {
        let mut b = TreeBuilder::new();
        b.start_node(NodeKind::CompilationUnit, 1);
        if let Some(package) = package {
            b.start_node(NodeKind::PackageDef, 1);
            b.qualified(package, 1);
            b.finish_node();
        }
        for (i, import) in imports.iter().enumerate() {
            let line = i + 3;
            b.start_node(NodeKind::Import, line);
            b.qualified(import, line);
            b.finish_node();
        }
        b.finish_node();
        b.finish().expect("valid tree")
    }

    fn check(rule: &mut ForbiddenDependency, tree: &SyntaxTree) -> Vec<usize> {
        let ctx = FileContext::new(Path::new("A.java"), "", Path::new("."));
        rule.begin_file(&ctx);
        let mut reporter = Reporter::new();
        for node in tree.root().descendants() {
            if rule.interests().contains(&node.kind()) {
                rule.visit(node, &mut reporter).expect("package or import");
            }
        }
        reporter.entries().map(|(line, _)| line).collect()
    }

    fn rule() -> ForbiddenDependency {
        ForbiddenDependency::new()
            .from_package("a.b.processmanager")
            .to_package("a.b.opc")
    }

    #[test]
    fn reports_forbidden_import_in_restricted_package() {
        let tree = file(
            Some("a.b.processmanager.sub"),
            &["a.b.opc.Thing", "a.b.other.Thing", "a.b.opc.*"],
        );
        assert_eq!(check(&mut rule(), &tree), vec![3, 5]);
    }

    #[test]
    fn flag_does_not_leak_into_next_file() {
        let mut rule = rule();
        let first = file(Some("a.b.processmanager.sub"), &["a.b.opc.Thing"]);
        let second = file(Some("a.b.unrelated"), &["a.b.opc.Thing"]);
        let third = file(None, &["a.b.opc.Thing"]);

        assert_eq!(check(&mut rule, &first), vec![3]);
        assert!(check(&mut rule, &second).is_empty());

        check(&mut rule, &first);
        assert!(check(&mut rule, &third).is_empty(), "begin_file resets");
    }

    #[test]
    fn prefixes_match_whole_segments() {
        let tree = file(Some("a.b.processmanagerx"), &["a.b.opc.Thing"]);
        assert!(check(&mut rule(), &tree).is_empty());

        let tree = file(Some("a.b.processmanager"), &["a.b.opcx.Thing"]);
        assert!(check(&mut rule(), &tree).is_empty());
    }

    #[test]
    fn default_message_and_prefixes() {
        let mut rule = ForbiddenDependency::new();
        let tree = file(
            Some("com.sun.j2ee.blueprints.processmanager.ejb"),
            &["com.sun.j2ee.blueprints.opc.admin.ejb.OPCAdminFacade"],
        );
        let ctx = FileContext::new(Path::new("A.java"), "", Path::new("."));
        rule.begin_file(&ctx);
        let mut reporter = Reporter::new();
        for node in tree.root().descendants() {
            if rule.interests().contains(&node.kind()) {
                rule.visit(node, &mut reporter).expect("package or import");
            }
        }
        let messages: Vec<&str> = reporter.entries().map(|(_, m)| m).collect();
        assert_eq!(messages, vec![DEFAULT_MESSAGE]);
    }
}
