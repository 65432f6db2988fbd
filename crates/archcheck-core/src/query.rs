//! Kind-agnostic tree search primitives.
//!
//! These are the building blocks rules use to inspect a tree: depth-first
//! search for one or all nodes of a kind, reconstruction of dotted names
//! from member-access chains, and a few class-level conveniences.

use crate::tree::{Node, NodeKind};

/// Contract violations raised by query operations.
///
/// These signal that a caller handed an operation a node it was not designed
/// for. Expected absences (no superclass, no matching declaration) are
/// reported as `None`, never as an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// The node passed in has the wrong kind.
    #[error("{operation} expects {expected}, found {found} at line {line}")]
    UnexpectedKind {
        /// Operation that was invoked.
        operation: &'static str,
        /// Human-readable list of accepted kinds.
        expected: &'static str,
        /// Kind that was actually supplied.
        found: NodeKind,
        /// Line of the supplied node.
        line: usize,
    },

    /// A child required by the grammar shape is missing.
    #[error("{operation}: {kind} at line {line} is missing its {missing}")]
    MissingChild {
        /// Operation that was invoked.
        operation: &'static str,
        /// Kind of the node that was inspected.
        kind: NodeKind,
        /// Line of the node that was inspected.
        line: usize,
        /// Description of the missing part.
        missing: &'static str,
    },
}

pub(crate) fn expect_kind(
    node: Node<'_>,
    operation: &'static str,
    accepted: &[NodeKind],
    expected: &'static str,
) -> Result<(), QueryError> {
    if accepted.contains(&node.kind()) {
        Ok(())
    } else {
        Err(QueryError::UnexpectedKind {
            operation,
            expected,
            found: node.kind(),
            line: node.line(),
        })
    }
}

/// Depth-first, pre-order search for the first node of `kind`.
///
/// `root` itself is a candidate.
#[must_use]
pub fn find_first_descendant(root: Node<'_>, kind: NodeKind) -> Option<Node<'_>> {
    if root.kind() == kind {
        return Some(root);
    }
    root.children()
        .find_map(|child| find_first_descendant(child, kind))
}

/// Collects every strict descendant of `root` with the given kind, in source
/// order. `root` itself is never included.
#[must_use]
pub fn find_all_descendants(root: Node<'_>, kind: NodeKind) -> Vec<Node<'_>> {
    root.descendants().filter(|n| n.kind() == kind).collect()
}

/// Rebuilds the dotted name of a package or import declaration.
///
/// `package a.b.c;` yields `"a.b.c"`, a single-segment name yields the bare
/// identifier, and a wildcard import keeps its `*`.
///
/// # Errors
///
/// Returns [`QueryError::UnexpectedKind`] if `node` is not a package or
/// import declaration.
pub fn qualified_name(node: Node<'_>) -> Result<String, QueryError> {
    const OPERATION: &str = "qualified_name";
    expect_kind(
        node,
        OPERATION,
        &[NodeKind::PackageDef, NodeKind::Import, NodeKind::StaticImport],
        "PACKAGE_DEF or IMPORT",
    )?;

    if let Some(dot) = find_first_descendant(node, NodeKind::Dot) {
        return Ok(dotted_name(dot));
    }
    find_first_descendant(node, NodeKind::Ident)
        .and_then(|ident| ident.text())
        .map(str::to_owned)
        .ok_or(QueryError::MissingChild {
            operation: OPERATION,
            kind: node.kind(),
            line: node.line(),
            missing: "name",
        })
}

/// Joins the segments of a member-access chain with `.`.
///
/// A leaf contributes its own text.
#[must_use]
pub fn dotted_name(node: Node<'_>) -> String {
    let mut out = String::new();
    append_segments(&mut out, node);
    out
}

fn append_segments(out: &mut String, node: Node<'_>) {
    if node.kind() != NodeKind::Dot {
        out.push_str(node.text().unwrap_or_default());
        return;
    }
    let mut parts = node.children();
    if let Some(left) = parts.next() {
        append_segments(out, left);
    }
    if let Some(right) = parts.next() {
        out.push('.');
        out.push_str(right.text().unwrap_or_default());
    }
}

/// Returns the name written in the `extends` clause of a class, if any.
///
/// The name is purely textual: `extends a.b.Base` yields `"a.b.Base"` and
/// `extends Base<T>` yields `"Base"`.
///
/// # Errors
///
/// Returns [`QueryError::UnexpectedKind`] if `class` is not a class definition.
pub fn super_class_name(class: Node<'_>) -> Result<Option<String>, QueryError> {
    expect_kind(class, "super_class_name", &[NodeKind::ClassDef], "CLASS_DEF")?;

    let name = class
        .find_child(NodeKind::ExtendsClause)
        .and_then(|clause| clause.first_child())
        .and_then(|target| match target.kind() {
            NodeKind::Dot => Some(dotted_name(target)),
            _ => target.text().map(str::to_owned),
        });
    Ok(name)
}

/// Returns true if any annotation in the subtree of `node` is named `name`.
///
/// Matching is exact and case-sensitive against the annotation's simple or
/// fully qualified name.
#[must_use]
pub fn has_annotation(node: Node<'_>, name: &str) -> bool {
    find_all_descendants(node, NodeKind::Annotation)
        .into_iter()
        .filter_map(|annotation| {
            annotation
                .children()
                .find(|c| matches!(c.kind(), NodeKind::Ident | NodeKind::Dot))
        })
        .any(|target| dotted_name(target) == name)
}

/// Returns true if `name` equals `prefix` or lies beneath it
/// (`a.b.c` is beneath `a.b`, `a.bc` is not).
#[must_use]
pub fn package_matches(name: &str, prefix: &str) -> bool {
    name == prefix
        || name
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('.'))
}
