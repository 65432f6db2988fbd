//! Rule requiring classes with a naming suffix to extend a base class.
//!
//! # Rationale
//!
//! Framework entry points are discovered by name (`*HTMLAction`) but only
//! work when they inherit the framework's support class. A class that
//! follows the naming convention without the inheritance compiles fine and
//! fails at runtime.
//!
//! # Detected Patterns
//!
//! ```java
//! public final class CatalogHTMLAction {                 // violation
//! class DummyHTMLAction extends HTMLActionSupport {      // ok
//! record ViewHTMLAction(String name) {                   // ok, records cannot extend
//! ```
//!
//! # Configuration
//!
//! - `suffix`: class name suffix that triggers the check (default: `HTMLAction`)
//! - `base_class`: required superclass (default: `HTMLActionSupport`)
//! - `message`: violation message
//! - `exempt_annotation`: classes carrying this annotation are skipped
//! - `ignore_inner_classes`: skip nested classes (default: false)

use archcheck_core::{
    has_annotation, is_inner_class, is_record, super_class_name, FileContext, Node, NodeKind,
    QueryError, Reporter, Rule, RuleConfig, Severity,
};

/// Rule code for require-base-class.
pub const CODE: &str = "AC001";

/// Rule name for require-base-class.
pub const NAME: &str = "require-base-class";

const DEFAULT_SUFFIX: &str = "HTMLAction";
const DEFAULT_BASE_CLASS: &str = "HTMLActionSupport";

/// Message used with the default suffix and base class.
pub const DEFAULT_MESSAGE: &str = "HTML action classes must extend HTMLActionSupport";

/// Requires classes named `*<suffix>` to extend `<base_class>`.
#[derive(Debug, Clone)]
pub struct RequireBaseClass {
    suffix: String,
    base_class: String,
    message: Option<String>,
    exempt_annotation: Option<String>,
    ignore_inner_classes: bool,
    severity: Severity,
}

impl Default for RequireBaseClass {
    fn default() -> Self {
        Self::new()
    }
}

impl RequireBaseClass {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_string(),
            base_class: DEFAULT_BASE_CLASS.to_string(),
            message: None,
            exempt_annotation: None,
            ignore_inner_classes: false,
            severity: Severity::Error,
        }
    }

    /// Builds the rule from its `[rules.require-base-class]` section.
    #[must_use]
    pub fn from_config(config: &RuleConfig) -> Self {
        let mut rule = Self::new()
            .suffix(config.get_str("suffix", DEFAULT_SUFFIX))
            .base_class(config.get_str("base_class", DEFAULT_BASE_CLASS))
            .ignore_inner_classes(config.get_bool("ignore_inner_classes", false));
        if let Some(message) = config.get_option::<String>("message") {
            rule = rule.message(message);
        }
        if let Some(annotation) = config.get_option::<String>("exempt_annotation") {
            rule = rule.exempt_annotation(annotation);
        }
        rule
    }

    /// Sets the class name suffix that triggers the check.
    #[must_use]
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Sets the required superclass name.
    #[must_use]
    pub fn base_class(mut self, base_class: impl Into<String>) -> Self {
        self.base_class = base_class.into();
        self
    }

    /// Overrides the violation message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Skips classes annotated with `annotation`.
    #[must_use]
    pub fn exempt_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.exempt_annotation = Some(annotation.into());
        self
    }

    /// Skips nested classes when set.
    #[must_use]
    pub fn ignore_inner_classes(mut self, ignore: bool) -> Self {
        self.ignore_inner_classes = ignore;
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn violation_message(&self) -> String {
        match &self.message {
            Some(message) => message.clone(),
            None if self.suffix == DEFAULT_SUFFIX && self.base_class == DEFAULT_BASE_CLASS => {
                DEFAULT_MESSAGE.to_string()
            }
            None => format!(
                "Classes named *{} must extend {}",
                self.suffix, self.base_class
            ),
        }
    }

    /// `extends Base` and `extends pkg.Base` both satisfy a base of `Base`.
    fn extends_base(&self, super_class: &str) -> bool {
        super_class == self.base_class
            || super_class
                .strip_suffix(self.base_class.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    }
}

impl Rule for RequireBaseClass {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires classes with a naming suffix to extend a base class"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn interests(&self) -> &'static [NodeKind] {
        &[NodeKind::ClassDef]
    }

    fn begin_file(&mut self, _ctx: &FileContext<'_>) {}

    fn visit(&mut self, class: Node<'_>, report: &mut Reporter) -> Result<(), QueryError> {
        let Some(name) = class.find_child(NodeKind::Ident).and_then(|n| n.text()) else {
            return Ok(());
        };
        // Records cannot extend anything.
        if !name.ends_with(self.suffix.as_str()) || is_record(class) {
            return Ok(());
        }
        if self.ignore_inner_classes && is_inner_class(class) {
            return Ok(());
        }
        if let Some(annotation) = &self.exempt_annotation {
            if has_annotation(class, annotation) {
                return Ok(());
            }
        }

        let extends_ok = super_class_name(class)?.is_some_and(|s| self.extends_base(&s));
        if !extends_ok {
            report.report_with_help(
                class.line(),
                self.violation_message(),
                format!("add `extends {}` to `{name}`", self.base_class),
            );
        }
        Ok(())
    }
}
