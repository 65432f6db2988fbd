//! Target extraction for `=` assignments.
//!
//! The identifier being assigned sits in a different place depending on
//! where the `ASSIGN` node appears:
//!
//! ```text
//! int x = 10;             VARIABLE_DEF(MODIFIERS, TYPE, IDENT, ASSIGN(EXPR ..))
//! @Bean(name = "dao")     ANNOTATION_MEMBER_VALUE_PAIR(IDENT, ASSIGN, EXPR ..)
//! result[0] = msg;        EXPR(ASSIGN(INDEX_OP(IDENT, EXPR ..), ..))
//! this.login = user;      EXPR(ASSIGN(DOT(LITERAL_THIS, IDENT), ..))
//! String[] h = {"a"};     VARIABLE_DEF(.., IDENT, ASSIGN(ARRAY_INIT ..))
//! x = 10;                 EXPR(ASSIGN(IDENT, ..))
//! ```

use crate::query::{expect_kind, QueryError};
use crate::tree::{Node, NodeKind};

/// Returns the name of the identifier an assignment writes to.
///
/// Shapes are tried in a fixed order and the first match decides. `None` is
/// returned when the assignment fits no known shape or the expected
/// identifier is missing.
///
/// # Errors
///
/// Returns [`QueryError::UnexpectedKind`] if `assign` is not an `ASSIGN` node.
pub fn assignment_target_name<'t>(assign: Node<'t>) -> Result<Option<&'t str>, QueryError> {
    expect_kind(assign, "assignment_target_name", &[NodeKind::Assign], "ASSIGN")?;
    Ok(target_ident(assign).and_then(|ident| ident.text()))
}

/// Returns the identifier node an assignment writes to.
///
/// Same shape rules as [`assignment_target_name`]; for the declaration and
/// annotation shapes this is the declared or member name itself.
#[must_use]
pub fn target_ident(assign: Node<'_>) -> Option<Node<'_>> {
    if assign.kind() != NodeKind::Assign {
        return None;
    }

    // Initializer of a variable definition.
    if assign.find_child(NodeKind::Expr).is_some() {
        return assign.prev_sibling();
    }

    if assign
        .parent()
        .is_some_and(|p| p.kind() == NodeKind::AnnotationMemberValuePair)
    {
        return assign.prev_sibling();
    }

    let first = assign.first_child()?;
    match first.kind() {
        NodeKind::IndexOp => first.first_child().filter(|n| n.kind() == NodeKind::Ident),
        NodeKind::Dot => {
            let qualifier = first.first_child()?;
            if qualifier.kind() == NodeKind::LiteralThis {
                first.find_child(NodeKind::Ident)
            } else {
                None
            }
        }
        NodeKind::ArrayInit | NodeKind::Lambda => assign.prev_sibling(),
        NodeKind::Ident => Some(first),
        _ => None,
    }
}
