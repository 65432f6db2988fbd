//! Declaration sites and their scopes.
//!
//! A declaration is a `VARIABLE_DEF` or `PARAMETER_DEF` node. Its scope is
//! the nearest enclosing class, constructor or method definition; scope
//! identity is the node itself.

use crate::query::{expect_kind, QueryError};
use crate::tree::{Node, NodeKind};

/// Returns the identifier declared by a variable or parameter definition.
///
/// # Errors
///
/// Returns [`QueryError::UnexpectedKind`] for any other node kind.
pub fn declared_name<'t>(def: Node<'t>) -> Result<&'t str, QueryError> {
    const OPERATION: &str = "declared_name";
    expect_kind(
        def,
        OPERATION,
        &[NodeKind::VariableDef, NodeKind::ParameterDef],
        "VARIABLE_DEF or PARAMETER_DEF",
    )?;
    def.declared_ident()
        .and_then(|ident| ident.text())
        .ok_or(QueryError::MissingChild {
            operation: OPERATION,
            kind: def.kind(),
            line: def.line(),
            missing: "declared identifier",
        })
}

/// Walks from `node` upward to the nearest class, constructor or method
/// definition. A scope node is its own scope.
///
/// Returns `None` only for nodes outside every class, such as package and
/// import declarations.
#[must_use]
pub fn enclosing_scope(node: Node<'_>) -> Option<Node<'_>> {
    std::iter::once(node)
        .chain(node.ancestors())
        .find(|n| n.kind().is_scope())
}

/// Nearest class definition strictly above `node`.
#[must_use]
pub fn enclosing_class(node: Node<'_>) -> Option<Node<'_>> {
    node.ancestors().find(|n| n.kind() == NodeKind::ClassDef)
}

/// Returns true if `class` is a record declaration.
#[must_use]
pub fn is_record(class: Node<'_>) -> bool {
    class.kind() == NodeKind::ClassDef && class.text() == Some("record")
}

/// Returns true if `class` is nested inside another class definition.
#[must_use]
pub fn is_inner_class(class: Node<'_>) -> bool {
    enclosing_class(class).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{SyntaxTree, TreeBuilder};

    // class Outer {          // 1
    //   int field;           // 2
    //   void run(int p) {    // 3
    //     int local;         // 4
    //   }
    //   class Inner {        // 6
    //     int deep;          // 7
    //   }
    // }
    fn sample() -> SyntaxTree {
        let mut b = TreeBuilder::new();
        b.start_node(NodeKind::CompilationUnit, 1);
        b.start_node(NodeKind::ClassDef, 1);
        b.leaf(NodeKind::Modifiers, 1);
        b.ident("Outer", 1);
        b.start_node(NodeKind::ObjBlock, 1);
        b.start_declaration(NodeKind::VariableDef, "int", "field", 2);
        b.finish_node();
        b.start_node(NodeKind::MethodDef, 3);
        b.leaf(NodeKind::Modifiers, 3);
        b.start_node(NodeKind::Type, 3);
        b.ident("void", 3);
        b.finish_node();
        b.ident("run", 3);
        b.start_node(NodeKind::Parameters, 3);
        b.start_declaration(NodeKind::ParameterDef, "int", "p", 3);
        b.finish_node();
        b.finish_node();
        b.start_node(NodeKind::Slist, 3);
        b.start_declaration(NodeKind::VariableDef, "int", "local", 4);
        b.finish_node();
        b.finish_node();
        b.finish_node();
        b.start_node(NodeKind::ClassDef, 6);
        b.leaf(NodeKind::Modifiers, 6);
        b.ident("Inner", 6);
        b.start_node(NodeKind::ObjBlock, 6);
        b.start_declaration(NodeKind::VariableDef, "int", "deep", 7);
        b.finish_node();
        b.finish_node();
        b.finish_node();
        b.finish_node();
        b.finish_node();
        b.finish_node();
        b.finish().expect("valid tree")
    }

    fn find<'t>(tree: &'t SyntaxTree, kind: NodeKind, line: usize) -> Node<'t> {
        tree.root()
            .descendants()
            .find(|n| n.kind() == kind && n.line() == line)
            .expect("node present")
    }

    #[test]
    fn declared_name_reads_third_child() {
        let tree = sample();
        assert_eq!(
            declared_name(find(&tree, NodeKind::VariableDef, 2)),
            Ok("field")
        );
        assert_eq!(
            declared_name(find(&tree, NodeKind::ParameterDef, 3)),
            Ok("p")
        );
        assert!(declared_name(find(&tree, NodeKind::MethodDef, 3)).is_err());
    }

    #[test]
    fn scope_of_field_is_class_and_of_local_is_method() {
        let tree = sample();
        let outer = find(&tree, NodeKind::ClassDef, 1);
        let method = find(&tree, NodeKind::MethodDef, 3);
        let inner = find(&tree, NodeKind::ClassDef, 6);

        assert_eq!(enclosing_scope(find(&tree, NodeKind::VariableDef, 2)), Some(outer));
        assert_eq!(enclosing_scope(find(&tree, NodeKind::ParameterDef, 3)), Some(method));
        assert_eq!(enclosing_scope(find(&tree, NodeKind::VariableDef, 4)), Some(method));
        assert_eq!(enclosing_scope(find(&tree, NodeKind::VariableDef, 7)), Some(inner));
        assert_eq!(enclosing_scope(method), Some(method));
        assert_eq!(enclosing_scope(tree.root()), None);
    }

    #[test]
    fn inner_class_detection() {
        let tree = sample();
        let outer = find(&tree, NodeKind::ClassDef, 1);
        let inner = find(&tree, NodeKind::ClassDef, 6);

        assert!(!is_inner_class(outer));
        assert!(is_inner_class(inner));
        assert_eq!(enclosing_class(inner), Some(outer));
        assert_eq!(enclosing_class(find(&tree, NodeKind::VariableDef, 7)), Some(inner));
    }
}
