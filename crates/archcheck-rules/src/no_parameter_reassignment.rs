//! Rule forbidding assignment to method and constructor parameters.
//!
//! # Detected Patterns
//!
//! ```java
//! void rename(String name) {
//!     name = name.trim();        // violation
//!     this.name = name;          // ok, field
//!     names[0] = name;           // ok, element write
//! }
//! ```
//!
//! Uses declaration resolution, so a local or field that shadows nothing is
//! never mistaken for a parameter.

use archcheck_core::{
    declared_name, resolve_declaration, target_ident, FileContext, Node, NodeKind, QueryError,
    Reporter, Rule, Severity,
};

/// Rule code for no-parameter-reassignment.
pub const CODE: &str = "AC003";

/// Rule name for no-parameter-reassignment.
pub const NAME: &str = "no-parameter-reassignment";

/// Reports `=` assignments whose target resolves to a parameter.
#[derive(Debug, Clone)]
pub struct NoParameterReassignment {
    severity: Severity,
}

impl Default for NoParameterReassignment {
    fn default() -> Self {
        Self::new()
    }
}

impl NoParameterReassignment {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Warning,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for NoParameterReassignment {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids assigning a new value to a parameter"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn interests(&self) -> &'static [NodeKind] {
        &[NodeKind::Assign]
    }

    fn begin_file(&mut self, _ctx: &FileContext<'_>) {}

    fn visit(&mut self, assign: Node<'_>, report: &mut Reporter) -> Result<(), QueryError> {
        // Initializers and annotation members are not reassignments.
        if assign.parent().is_some_and(|p| {
            matches!(
                p.kind(),
                NodeKind::VariableDef | NodeKind::AnnotationMemberValuePair
            )
        }) {
            return Ok(());
        }

        let Some(target) = target_ident(assign) else {
            return Ok(());
        };
        if target.parent().is_some_and(|p| p.kind() == NodeKind::IndexOp) {
            return Ok(());
        }

        if let Some(decl) = resolve_declaration(target)? {
            if decl.kind() == NodeKind::ParameterDef {
                report.report_with_help(
                    assign.line(),
                    format!("Parameter `{}` is reassigned", declared_name(decl)?),
                    "assign to a new local variable instead",
                );
            }
        }
        Ok(())
    }
}
