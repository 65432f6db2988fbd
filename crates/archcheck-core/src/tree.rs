//! Arena-backed syntax tree.
//!
//! Nodes live in a single `Vec` owned by [`SyntaxTree`] and reference each
//! other through [`NodeId`] indices: every record keeps its parent id and an
//! ordered list of child ids. [`Node`] is a cheap `Copy` handle pairing a tree
//! with an id, used for all navigation.
//!
//! Trees are only constructed through [`TreeBuilder`], which checks the
//! grammar shapes the query layer depends on when [`TreeBuilder::finish`] is
//! called. A tree that exists is therefore known to have, for example, an
//! identifier in third position under every variable definition.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Closed set of node kinds produced by a frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Root of a source file.
    CompilationUnit,
    /// `package a.b.c;`
    PackageDef,
    /// `import a.b.C;`
    Import,
    /// `import static a.b.C.m;`
    StaticImport,
    /// Class declaration. Records are class definitions with the text
    /// `record`.
    ClassDef,
    /// Interface declaration.
    InterfaceDef,
    /// Enum declaration.
    EnumDef,
    /// Class, interface or enum body.
    ObjBlock,
    /// Modifier list of a declaration.
    Modifiers,
    /// A single modifier keyword such as `public`.
    Modifier,
    /// `@Name` or `@Name(...)`.
    Annotation,
    /// `name = value` inside annotation arguments.
    AnnotationMemberValuePair,
    /// `extends` clause.
    ExtendsClause,
    /// `implements` clause.
    ImplementsClause,
    /// Constructor declaration.
    CtorDef,
    /// Method declaration.
    MethodDef,
    /// Formal parameter list.
    Parameters,
    /// Formal, catch or lambda parameter.
    ParameterDef,
    /// Field or local variable declarator.
    VariableDef,
    /// Declared type of a variable, parameter or method.
    Type,
    /// `<A, B>` type argument list.
    TypeArguments,
    /// `[]` dimension marker.
    ArrayDeclarator,
    /// Statement list (block body).
    Slist,
    /// Expression wrapper.
    Expr,
    /// Argument list.
    Elist,
    /// `=` assignment.
    Assign,
    /// Identifier.
    Ident,
    /// Member access `a.b`.
    Dot,
    /// `*` of a wildcard import.
    Star,
    /// `this`
    LiteralThis,
    /// `super`
    LiteralSuper,
    /// Any other literal (numbers, strings, `null`, booleans).
    Literal,
    /// Method invocation.
    MethodCall,
    /// Object or array creation.
    New,
    /// Array element access `a[i]`.
    IndexOp,
    /// `{1, 2, 3}` array initializer.
    ArrayInit,
    /// Lambda expression.
    Lambda,
    /// Binary, unary or compound-assignment operator; text holds the operator.
    Operator,
    /// Enhanced `for (T x : xs)` loop.
    ForEach,
    /// Any construct without a dedicated kind.
    Other,
}

impl NodeKind {
    /// Returns true for kinds that open a resolution scope.
    #[must_use]
    pub fn is_scope(self) -> bool {
        matches!(self, Self::ClassDef | Self::CtorDef | Self::MethodDef)
    }

    /// Returns true for variable and parameter definitions.
    #[must_use]
    pub fn is_declaration(self) -> bool {
        matches!(self, Self::VariableDef | Self::ParameterDef)
    }

    /// Returns true for package and import declarations.
    #[must_use]
    pub fn is_qualified_name_holder(self) -> bool {
        matches!(self, Self::PackageDef | Self::Import | Self::StaticImport)
    }

    /// Upper-case tag used in diagnostics and debug dumps.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CompilationUnit => "COMPILATION_UNIT",
            Self::PackageDef => "PACKAGE_DEF",
            Self::Import => "IMPORT",
            Self::StaticImport => "STATIC_IMPORT",
            Self::ClassDef => "CLASS_DEF",
            Self::InterfaceDef => "INTERFACE_DEF",
            Self::EnumDef => "ENUM_DEF",
            Self::ObjBlock => "OBJBLOCK",
            Self::Modifiers => "MODIFIERS",
            Self::Modifier => "MODIFIER",
            Self::Annotation => "ANNOTATION",
            Self::AnnotationMemberValuePair => "ANNOTATION_MEMBER_VALUE_PAIR",
            Self::ExtendsClause => "EXTENDS_CLAUSE",
            Self::ImplementsClause => "IMPLEMENTS_CLAUSE",
            Self::CtorDef => "CTOR_DEF",
            Self::MethodDef => "METHOD_DEF",
            Self::Parameters => "PARAMETERS",
            Self::ParameterDef => "PARAMETER_DEF",
            Self::VariableDef => "VARIABLE_DEF",
            Self::Type => "TYPE",
            Self::TypeArguments => "TYPE_ARGUMENTS",
            Self::ArrayDeclarator => "ARRAY_DECLARATOR",
            Self::Slist => "SLIST",
            Self::Expr => "EXPR",
            Self::Elist => "ELIST",
            Self::Assign => "ASSIGN",
            Self::Ident => "IDENT",
            Self::Dot => "DOT",
            Self::Star => "STAR",
            Self::LiteralThis => "LITERAL_THIS",
            Self::LiteralSuper => "LITERAL_SUPER",
            Self::Literal => "LITERAL",
            Self::MethodCall => "METHOD_CALL",
            Self::New => "LITERAL_NEW",
            Self::IndexOp => "INDEX_OP",
            Self::ArrayInit => "ARRAY_INIT",
            Self::Lambda => "LAMBDA",
            Self::Operator => "OPERATOR",
            Self::ForEach => "FOR_EACH",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable index of a node inside its [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Position of the node in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    text: Option<String>,
    line: usize,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Immutable syntax tree of one source file.
///
/// The root is always the first node allocated by the builder.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
}

impl SyntaxTree {
    /// Returns the root node.
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        Node {
            tree: self,
            id: NodeId(0),
        }
    }

    /// Returns the node with the given id, if it belongs to this tree.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<Node<'_>> {
        (id.index() < self.nodes.len()).then_some(Node { tree: self, id })
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a built tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Renders the tree as an indented outline, one node per line.
    #[must_use]
    pub fn dump(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let mut stack = vec![(self.root(), 0usize)];
        while let Some((node, depth)) = stack.pop() {
            let _ = write!(out, "{}{} @{}", "  ".repeat(depth), node.kind(), node.line());
            if let Some(text) = node.text() {
                let _ = write!(out, " `{text}`");
            }
            out.push('\n');
            let children: Vec<_> = node.children().collect();
            for child in children.into_iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        out
    }
}

/// Handle to a node of a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl<'t> Node<'t> {
    fn data(&self) -> &'t NodeData {
        &self.tree.nodes[self.id.index()]
    }

    fn at(&self, id: NodeId) -> Node<'t> {
        Node {
            tree: self.tree,
            id,
        }
    }

    /// Arena id of this node.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Tree this node belongs to.
    #[must_use]
    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    /// Kind tag.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.data().kind
    }

    /// Literal payload, present on identifier and keyword leaves.
    #[must_use]
    pub fn text(&self) -> Option<&'t str> {
        self.data().text.as_deref()
    }

    /// 1-based source line.
    #[must_use]
    pub fn line(&self) -> usize {
        self.data().line
    }

    /// Parent node, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Node<'t>> {
        self.data().parent.map(|id| self.at(id))
    }

    /// Children in source order.
    pub fn children(&self) -> impl DoubleEndedIterator<Item = Node<'t>> + 't {
        let tree = self.tree;
        self.data()
            .children
            .iter()
            .map(move |&id| Node { tree, id })
    }

    /// Number of direct children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    /// Child at `index`.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<Node<'t>> {
        self.data().children.get(index).map(|&id| self.at(id))
    }

    /// First child.
    #[must_use]
    pub fn first_child(&self) -> Option<Node<'t>> {
        self.child(0)
    }

    /// First direct child of the given kind.
    #[must_use]
    pub fn find_child(&self, kind: NodeKind) -> Option<Node<'t>> {
        self.children().find(|c| c.kind() == kind)
    }

    fn position_in_parent(&self) -> Option<(Node<'t>, usize)> {
        let parent = self.parent()?;
        let index = parent
            .data()
            .children
            .iter()
            .position(|&id| id == self.id)?;
        Some((parent, index))
    }

    /// Sibling immediately before this node.
    #[must_use]
    pub fn prev_sibling(&self) -> Option<Node<'t>> {
        let (parent, index) = self.position_in_parent()?;
        index.checked_sub(1).and_then(|i| parent.child(i))
    }

    /// Sibling immediately after this node.
    #[must_use]
    pub fn next_sibling(&self) -> Option<Node<'t>> {
        let (parent, index) = self.position_in_parent()?;
        parent.child(index + 1)
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = Node<'t>> + 't {
        std::iter::successors(self.parent(), Node::parent)
    }

    /// Strict descendants in depth-first pre-order (source order).
    #[must_use]
    pub fn descendants(&self) -> Descendants<'t> {
        let mut stack: Vec<Node<'t>> = self.children().collect();
        stack.reverse();
        Descendants { stack }
    }

    /// Declared identifier of a variable or parameter definition.
    ///
    /// The builder guarantees the identifier sits after the modifiers and
    /// the type, so this is `Some` for every definition node.
    #[must_use]
    pub fn declared_ident(&self) -> Option<Node<'t>> {
        if self.kind().is_declaration() {
            self.child(2).filter(|c| c.kind() == NodeKind::Ident)
        } else {
            None
        }
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl Hash for Node<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id.0)
            .field("kind", &self.kind())
            .field("text", &self.text())
            .field("line", &self.line())
            .finish()
    }
}

/// Pre-order iterator over the strict descendants of a node.
pub struct Descendants<'t> {
    stack: Vec<Node<'t>>,
}

impl<'t> Iterator for Descendants<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let start = self.stack.len();
        self.stack.extend(node.children());
        self.stack[start..].reverse();
        Some(node)
    }
}

/// Errors raised when a builder cannot produce a well-formed tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// No node was ever started.
    #[error("tree has no nodes")]
    Empty,

    /// `finish` was called with nodes still open.
    #[error("{0} node(s) left open")]
    Unclosed(usize),

    /// `finish_node` was called with no open node.
    #[error("finish_node called without a matching start_node")]
    Unbalanced,

    /// More than one top-level node was produced.
    #[error("tree has {0} root nodes, expected one")]
    MultipleRoots(usize),

    /// A node does not have the shape its kind requires.
    #[error("malformed {kind} at line {line}: {reason}")]
    Malformed {
        /// Kind of the offending node.
        kind: NodeKind,
        /// Line of the offending node.
        line: usize,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// Incremental builder for [`SyntaxTree`].
///
/// Nodes are opened with [`start_node`](Self::start_node), filled with
/// children, and closed with [`finish_node`](Self::finish_node). Leaves are
/// added with [`token`](Self::token) or [`leaf`](Self::leaf).
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<NodeData>,
    stack: Vec<NodeId>,
    roots: usize,
    unbalanced: bool,
}

impl TreeBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: NodeKind, text: Option<String>, line: usize) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        let parent = self.stack.last().copied();
        match parent {
            Some(p) => self.nodes[p.index()].children.push(id),
            None => self.roots += 1,
        }
        self.nodes.push(NodeData {
            kind,
            text,
            line,
            parent,
            children: Vec::new(),
        });
        id
    }

    /// Opens a composite node; subsequent nodes become its children.
    pub fn start_node(&mut self, kind: NodeKind, line: usize) -> NodeId {
        let id = self.push(kind, None, line);
        self.stack.push(id);
        id
    }

    /// Opens a composite node that also carries text (e.g. an operator).
    pub fn start_node_with_text(
        &mut self,
        kind: NodeKind,
        text: impl Into<String>,
        line: usize,
    ) -> NodeId {
        let id = self.push(kind, Some(text.into()), line);
        self.stack.push(id);
        id
    }

    /// Closes the innermost open node.
    pub fn finish_node(&mut self) {
        if self.stack.pop().is_none() {
            self.unbalanced = true;
        }
    }

    /// Adds a leaf carrying text.
    pub fn token(&mut self, kind: NodeKind, text: impl Into<String>, line: usize) -> NodeId {
        self.push(kind, Some(text.into()), line)
    }

    /// Adds a leaf without text.
    pub fn leaf(&mut self, kind: NodeKind, line: usize) -> NodeId {
        self.push(kind, None, line)
    }

    /// Adds an identifier leaf.
    pub fn ident(&mut self, name: impl Into<String>, line: usize) -> NodeId {
        self.token(NodeKind::Ident, name, line)
    }

    /// Adds a dotted name as a left-nested chain of [`NodeKind::Dot`] nodes.
    ///
    /// `a.b.c` becomes `DOT(DOT(a, b), c)`; a name without dots becomes a
    /// single identifier. A trailing `*` segment becomes a [`NodeKind::Star`].
    pub fn qualified(&mut self, name: &str, line: usize) {
        let segments: Vec<&str> = name.split('.').collect();
        for _ in 1..segments.len() {
            self.start_node(NodeKind::Dot, line);
        }
        for (i, segment) in segments.iter().enumerate() {
            if *segment == "*" {
                self.token(NodeKind::Star, "*", line);
            } else {
                self.ident(*segment, line);
            }
            if i > 0 {
                self.finish_node();
            }
        }
    }

    /// Opens a variable or parameter definition and fills in its modifiers,
    /// type and name. The node stays open for an initializer; close it with
    /// [`finish_node`](Self::finish_node).
    pub fn start_declaration(
        &mut self,
        kind: NodeKind,
        type_name: &str,
        name: &str,
        line: usize,
    ) -> NodeId {
        let id = self.start_node(kind, line);
        self.leaf(NodeKind::Modifiers, line);
        self.start_node(NodeKind::Type, line);
        self.ident(type_name, line);
        self.finish_node();
        self.ident(name, line);
        id
    }

    /// Validates and returns the finished tree.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError`] when the builder calls were unbalanced or a node
    /// lacks the children its kind requires.
    pub fn finish(self) -> Result<SyntaxTree, TreeError> {
        if self.nodes.is_empty() {
            return Err(TreeError::Empty);
        }
        if self.unbalanced {
            return Err(TreeError::Unbalanced);
        }
        if !self.stack.is_empty() {
            return Err(TreeError::Unclosed(self.stack.len()));
        }
        if self.roots > 1 {
            return Err(TreeError::MultipleRoots(self.roots));
        }

        let tree = SyntaxTree { nodes: self.nodes };
        for index in 0..tree.nodes.len() {
            let id = NodeId(u32::try_from(index).unwrap_or(u32::MAX));
            if let Some(node) = tree.get(id) {
                validate_shape(node)?;
            }
        }
        Ok(tree)
    }
}

fn has_named_child(node: Node<'_>, kinds: &[NodeKind]) -> bool {
    node.children()
        .any(|c| kinds.contains(&c.kind()) && (c.kind() == NodeKind::Dot || c.text().is_some()))
}

fn validate_shape(node: Node<'_>) -> Result<(), TreeError> {
    let malformed = |reason| TreeError::Malformed {
        kind: node.kind(),
        line: node.line(),
        reason,
    };

    match node.kind() {
        NodeKind::VariableDef | NodeKind::ParameterDef => {
            let kinds: Vec<NodeKind> = node.children().take(3).map(|c| c.kind()).collect();
            let name_has_text = node.child(2).and_then(|c| c.text()).is_some();
            if kinds != [NodeKind::Modifiers, NodeKind::Type, NodeKind::Ident] || !name_has_text {
                return Err(malformed(
                    "expected MODIFIERS, TYPE and a named IDENT as the first three children",
                ));
            }
        }
        NodeKind::ClassDef | NodeKind::InterfaceDef | NodeKind::EnumDef => {
            if !has_named_child(node, &[NodeKind::Ident]) {
                return Err(malformed("type declaration has no name"));
            }
        }
        NodeKind::PackageDef | NodeKind::Import | NodeKind::StaticImport => {
            if !has_named_child(node, &[NodeKind::Ident, NodeKind::Dot]) {
                return Err(malformed("declaration has no qualified name"));
            }
        }
        NodeKind::Dot => {
            if node.child_count() != 2 {
                return Err(malformed("member access must have exactly two parts"));
            }
        }
        NodeKind::Ident => {
            if node.text().is_none() {
                return Err(malformed("identifier has no text"));
            }
        }
        _ => {}
    }
    Ok(())
}
