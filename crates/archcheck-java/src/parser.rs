//! Java frontend built on tree-sitter.

use archcheck_core::{ParseError, SourceParser, SyntaxTree};
use tracing::debug;
use tree_sitter::{Language, Node as TsNode, Parser};

use crate::lowering::{line_of, lower};

/// Parses Java source files into archcheck syntax trees.
pub struct JavaParser {
    language: Language,
    parser: Parser,
}

impl JavaParser {
    /// Creates a new Java parser.
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: tree_sitter_java::LANGUAGE.into(),
            parser: Parser::new(),
        }
    }
}

impl Default for JavaParser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for JavaParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JavaParser").finish_non_exhaustive()
    }
}

/// Line of the first error or missing node under `root`, in source order.
fn first_error_line(root: TsNode<'_>) -> Option<usize> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(line_of(node));
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<_> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    None
}

impl SourceParser for JavaParser {
    fn language_id(&self) -> &'static str {
        "java"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["java"]
    }

    fn parse(&mut self, source: &str) -> Result<SyntaxTree, ParseError> {
        self.parser
            .set_language(&self.language)
            .map_err(|e| ParseError::Language {
                language: "java",
                message: e.to_string(),
            })?;

        let tree = self.parser.parse(source, None).ok_or(ParseError::NoTree)?;
        let root = tree.root_node();
        if root.has_error() {
            let line = first_error_line(root).unwrap_or(1);
            debug!(line, "java source has syntax errors");
            return Err(ParseError::Syntax { line });
        }

        lower(root, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archcheck_core::NodeKind;

    #[test]
    fn advertises_java_files() {
        let parser = JavaParser::new();
        assert_eq!(parser.language_id(), "java");
        assert_eq!(parser.extensions(), &["java"]);
    }

    #[test]
    fn empty_source_is_a_bare_compilation_unit() {
        let tree = JavaParser::new().parse("").expect("empty file");
        assert_eq!(tree.root().kind(), NodeKind::CompilationUnit);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn reports_first_syntax_error_line() {
        let err = JavaParser::new()
            .parse("class A {\n  void m() {\n    int x = ;\n  }\n}\n")
            .expect_err("broken source");
        assert_eq!(err, ParseError::Syntax { line: 3 });
    }

    #[test]
    fn parser_is_reusable() {
        let mut parser = JavaParser::new();
        assert!(parser.parse("class A {}").is_ok());
        assert!(parser.parse("class {").is_err());
        assert!(parser.parse("class B {}").is_ok());
    }
}
