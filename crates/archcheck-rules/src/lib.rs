//! # archcheck-rules
//!
//! Built-in structural rules for archcheck.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | AC001 | `require-base-class` | Classes named `*HTMLAction` must extend `HTMLActionSupport` |
//! | AC002 | `forbidden-dependency` | `processmanager` packages must not import `opc` packages |
//! | AC003 | `no-parameter-reassignment` | Parameters must not be reassigned |
//!
//! ## Usage
//!
//! ```ignore
//! use archcheck_core::Analyzer;
//! use archcheck_rules::{ForbiddenDependency, RequireBaseClass};
//!
//! let analyzer = Analyzer::builder()
//!     .root("./src")
//!     .rule(RequireBaseClass::new())
//!     .rule(ForbiddenDependency::new().from_package("a.b.web").to_package("a.b.db"))
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod forbidden_dependency;
pub mod no_parameter_reassignment;
mod presets;
pub mod require_base_class;

pub use forbidden_dependency::ForbiddenDependency;
pub use no_parameter_reassignment::NoParameterReassignment;
pub use presets::{all_rules, rule_by_name, rules_from_config, select_rules, RULE_NAMES};
pub use require_base_class::RequireBaseClass;

/// Re-export core types for convenience.
pub use archcheck_core::{Rule, Severity, Violation};
