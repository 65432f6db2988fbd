//! # archcheck-core
//!
//! Core framework for structural rule checking over Java syntax trees.
//!
//! This crate provides:
//!
//! - [`SyntaxTree`], an immutable arena tree built through [`TreeBuilder`]
//! - query primitives such as [`find_first_descendant`] and [`qualified_name`]
//! - declaration scopes ([`enclosing_scope`]) and [`resolve_declaration`],
//!   which binds an identifier use to the variable or parameter it names
//! - the [`Rule`] trait, the per-file [`walk`] and the [`Analyzer`] driver
//!
//! ## Example
//!
//! ```ignore
//! use archcheck_core::Analyzer;
//!
//! let mut analyzer = Analyzer::builder()
//!     .root("./src")
//!     .parser(JavaParser::new())
//!     .rule(MyRule::default())
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! print!("{}", result.format());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod assignment;
mod config;
mod context;
mod declaration;
mod parser;
mod query;
mod resolve;
mod rule;
mod tree;
mod types;

/// Comment-based allow directives.
pub mod allowance;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use assignment::{assignment_target_name, target_ident};
pub use config::{AnalyzerConfig, Config, ConfigError, RuleConfig};
pub use context::FileContext;
pub use declaration::{
    declared_name, enclosing_class, enclosing_scope, is_inner_class, is_record,
};
pub use parser::{ParseError, ParserBox, SourceParser};
pub use query::{
    dotted_name, find_all_descendants, find_first_descendant, has_annotation, package_matches,
    qualified_name, super_class_name, QueryError,
};
pub use resolve::resolve_declaration;
pub use rule::{walk, FileReport, Reporter, Rule, RuleBox};
pub use tree::{Descendants, Node, NodeId, NodeKind, SyntaxTree, TreeBuilder, TreeError};
pub use types::{LintResult, Location, Severity, Suggestion, Violation, ViolationDiagnostic};
