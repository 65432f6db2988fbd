//! # archcheck-java
//!
//! Java frontend for archcheck.
//!
//! Parses Java source with tree-sitter-java and lowers the concrete syntax
//! tree into the [`archcheck_core::SyntaxTree`] model that rules query.
//!
//! ```ignore
//! use archcheck_core::{Analyzer, SourceParser};
//! use archcheck_java::JavaParser;
//!
//! let tree = JavaParser::new().parse("package a.b; class C {}")?;
//!
//! let mut analyzer = Analyzer::builder()
//!     .root("./src")
//!     .parser(JavaParser::new())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod lowering;
mod parser;

pub use parser::JavaParser;
