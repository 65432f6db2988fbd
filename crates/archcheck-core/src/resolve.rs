//! Binding of identifier uses to their declarations.
//!
//! Resolution is line-based. Only variable and parameter definitions inside
//! the nearest enclosing class are candidates, and a declaration placed on a
//! later line than the use never matches.
//!
//! - `this.x` binds to the first field of the class named `x`.
//! - Otherwise the latest preceding variable in the use's own scope or in the
//!   class body is taken, and a parameter of the use's scope shadows it.

use crate::declaration::{declared_name, enclosing_class, enclosing_scope};
use crate::query::{expect_kind, find_all_descendants, QueryError};
use crate::tree::{Node, NodeKind};

/// Finds the variable or parameter definition an identifier use binds to.
///
/// Returns `Ok(None)` when nothing visible matches, including uses that sit
/// outside every class.
///
/// # Errors
///
/// Returns [`QueryError::UnexpectedKind`] if `ident` is not an identifier.
pub fn resolve_declaration<'t>(ident: Node<'t>) -> Result<Option<Node<'t>>, QueryError> {
    expect_kind(ident, "resolve_declaration", &[NodeKind::Ident], "IDENT")?;

    let Some(name) = ident.text() else {
        return Ok(None);
    };
    let Some(class) = enclosing_class(ident) else {
        return Ok(None);
    };
    let use_line = ident.line();
    let use_scope = enclosing_scope(ident);

    // Only `DOT(LITERAL_THIS, IDENT)`; `foo(this, x)` leaves `x` unqualified.
    let qualified_by_this = ident.parent().is_some_and(|p| p.kind() == NodeKind::Dot)
        && ident
            .prev_sibling()
            .is_some_and(|n| n.kind() == NodeKind::LiteralThis);

    let variables = candidates(class, NodeKind::VariableDef, name, use_line)?;

    if qualified_by_this {
        let field = variables
            .into_iter()
            .find(|def| enclosing_scope(*def) == Some(class));
        return Ok(field);
    }

    let variable = latest(
        variables
            .into_iter()
            .filter(|def| {
                let scope = enclosing_scope(*def);
                scope == use_scope || scope == Some(class)
            }),
    );

    let parameter = latest(
        candidates(class, NodeKind::ParameterDef, name, use_line)?
            .into_iter()
            .filter(|def| enclosing_scope(*def) == use_scope),
    );

    Ok(parameter.or(variable))
}

/// Definitions of `kind` under `class` declaring `name` no later than `line`,
/// in depth-first order.
fn candidates<'t>(
    class: Node<'t>,
    kind: NodeKind,
    name: &str,
    line: usize,
) -> Result<Vec<Node<'t>>, QueryError> {
    let mut found = Vec::new();
    for def in find_all_descendants(class, kind) {
        if def.line() <= line && declared_name(def)? == name {
            found.push(def);
        }
    }
    Ok(found)
}

/// Candidate with the greatest line; on equal lines the later one wins.
fn latest<'t>(defs: impl Iterator<Item = Node<'t>>) -> Option<Node<'t>> {
    defs.fold(None, |best: Option<Node<'t>>, def| match best {
        Some(b) if def.line() < b.line() => Some(b),
        _ => Some(def),
    })
}
