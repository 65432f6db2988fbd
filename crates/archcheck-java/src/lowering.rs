//! Conversion of tree-sitter-java parse trees into archcheck syntax trees.
//!
//! The concrete grammar is much richer than the core node set, so lowering
//! keeps the constructs rules inspect (declarations, assignments, member
//! access, imports) in their dedicated shapes and folds everything else into
//! [`NodeKind::Other`] with its named children preserved.
//!
//! A few mappings worth knowing:
//!
//! - every declarator of `int a = 1, b;` becomes its own `VARIABLE_DEF`
//! - parenthesized expressions disappear, their content takes their place
//! - `x = v` becomes `ASSIGN(x, v)`; `x += v` becomes `OPERATOR "+="`
//! - records are lowered as classes tagged `record`, their components as fields

use archcheck_core::{NodeKind, ParseError, SyntaxTree, TreeBuilder};
use tree_sitter::Node as TsNode;

/// Deepest nesting of constructs lowered before a file is rejected.
///
/// Left-nested operator chains such as long string concatenations are
/// lowered iteratively and do not count towards it.
pub(crate) const MAX_DEPTH: usize = 512;

/// 1-based line of a tree-sitter node.
pub(crate) fn line_of(node: TsNode<'_>) -> usize {
    node.start_position().row + 1
}

fn named(node: TsNode<'_>) -> Vec<TsNode<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn is_comment(node: TsNode<'_>) -> bool {
    matches!(node.kind(), "line_comment" | "block_comment")
}

fn is_literal(kind: &str) -> bool {
    kind.ends_with("_literal") || matches!(kind, "true" | "false" | "text_block")
}

/// Lowers the `program` node of a parsed Java file.
pub(crate) fn lower(root: TsNode<'_>, source: &str) -> Result<SyntaxTree, ParseError> {
    let mut lowering = Lowering {
        src: source.as_bytes(),
        builder: TreeBuilder::new(),
        depth: 0,
        too_deep: None,
    };
    lowering.builder.start_node(NodeKind::CompilationUnit, 1);
    for child in named(root) {
        lowering.lower(child);
    }
    lowering.builder.finish_node();

    if let Some(line) = lowering.too_deep {
        return Err(ParseError::NestingTooDeep {
            line,
            limit: MAX_DEPTH,
        });
    }
    Ok(lowering.builder.finish()?)
}

struct Lowering<'s> {
    src: &'s [u8],
    builder: TreeBuilder,
    depth: usize,
    /// Line of the first node skipped for exceeding [`MAX_DEPTH`].
    too_deep: Option<usize>,
}

impl<'s> Lowering<'s> {
    fn text(&self, node: TsNode<'_>) -> &'s str {
        self.src
            .get(node.byte_range())
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .unwrap_or("")
    }

    fn lower(&mut self, node: TsNode<'_>) {
        if self.depth >= MAX_DEPTH {
            self.too_deep.get_or_insert(line_of(node));
            return;
        }
        self.depth += 1;
        self.lower_node(node);
        self.depth -= 1;
    }

    fn lower_node(&mut self, node: TsNode<'_>) {
        let line = line_of(node);
        match node.kind() {
            "line_comment" | "block_comment" => {}

            "package_declaration" => self.package(node),
            "import_declaration" => self.import(node),

            "class_declaration" | "record_declaration" => {
                self.type_declaration(node, NodeKind::ClassDef);
            }
            "interface_declaration" | "annotation_type_declaration" => {
                self.type_declaration(node, NodeKind::InterfaceDef);
            }
            "enum_declaration" => self.type_declaration(node, NodeKind::EnumDef),
            "class_body" | "interface_body" | "enum_body" | "annotation_type_body" => {
                self.body(node, None);
            }

            "field_declaration" | "constant_declaration" | "local_variable_declaration" => {
                self.variables(node);
            }
            "method_declaration" | "annotation_type_element_declaration" => self.method(node),
            "constructor_declaration" | "compact_constructor_declaration" => {
                self.constructor(node);
            }
            "formal_parameter" | "spread_parameter" | "catch_formal_parameter" => {
                self.parameter(node);
            }
            "resource" => self.resource(node),
            "enhanced_for_statement" => self.for_each(node),
            "lambda_expression" => self.lambda(node),

            "modifiers" => self.modifier_list(node),
            "annotation" | "marker_annotation" => self.annotation(node),

            "block" | "constructor_body" => self.nest(NodeKind::Slist, node),
            "expression_statement" => self.nest(NodeKind::Expr, node),
            "argument_list" => self.nest(NodeKind::Elist, node),
            "array_initializer" => self.nest(NodeKind::ArrayInit, node),
            "explicit_constructor_invocation" => self.nest(NodeKind::MethodCall, node),
            "parenthesized_expression" => {
                for child in named(node) {
                    self.lower(child);
                }
            }

            "assignment_expression" => self.assignment(node),
            "binary_expression" => self.binary_chain(node),
            "unary_expression" | "update_expression" => self.operator(node),
            "field_access" => self.field_access(node),
            "method_invocation" => self.method_call(node),
            "array_access" => self.array_access(node),
            "object_creation_expression" | "array_creation_expression" => self.creation(node),

            "this" => {
                self.builder.leaf(NodeKind::LiteralThis, line);
            }
            "super" => {
                self.builder.leaf(NodeKind::LiteralSuper, line);
            }
            "identifier" | "type_identifier" => {
                let name = self.text(node);
                self.builder.ident(name, line);
            }
            "scoped_identifier" => {
                let name = self.type_name(node);
                self.builder.qualified(&name, line);
            }
            "integral_type" | "floating_point_type" | "boolean_type" | "void_type"
            | "generic_type" | "scoped_type_identifier" | "array_type" => {
                self.type_ref(Some(node), line);
            }
            kind if is_literal(kind) => {
                let text = self.text(node);
                self.builder.token(NodeKind::Literal, text, line);
            }

            _ => self.nest(NodeKind::Other, node),
        }
    }

    /// Wraps the lowered named children of `node` in a node of `kind`.
    fn nest(&mut self, kind: NodeKind, node: TsNode<'_>) {
        self.builder.start_node(kind, line_of(node));
        for child in named(node) {
            self.lower(child);
        }
        self.builder.finish_node();
    }

    fn expr(&mut self, node: TsNode<'_>) {
        self.builder.start_node(NodeKind::Expr, line_of(node));
        self.lower(node);
        self.builder.finish_node();
    }

    /// Textual name of a type or qualified identifier, without type arguments.
    fn type_name(&self, node: TsNode<'_>) -> String {
        match node.kind() {
            "generic_type" => named(node)
                .into_iter()
                .find(|c| c.kind() != "type_arguments")
                .map(|base| self.type_name(base))
                .unwrap_or_default(),
            "scoped_type_identifier" | "scoped_identifier" => named(node)
                .into_iter()
                .filter(|c| !matches!(c.kind(), "annotation" | "marker_annotation") && !is_comment(*c))
                .map(|c| self.type_name(c))
                .collect::<Vec<_>>()
                .join("."),
            "array_type" => node
                .child_by_field_name("element")
                .map(|element| self.type_name(element))
                .unwrap_or_default(),
            "annotated_type" | "catch_type" => named(node)
                .into_iter()
                .rfind(|c| !matches!(c.kind(), "annotation" | "marker_annotation") && !is_comment(*c))
                .map(|c| self.type_name(c))
                .unwrap_or_default(),
            _ => self.text(node).to_owned(),
        }
    }

    /// `TYPE(name)`, or an empty `TYPE` when the type is implicit.
    fn type_ref(&mut self, node: Option<TsNode<'_>>, line: usize) {
        let Some(ty) = node else {
            self.builder.leaf(NodeKind::Type, line);
            return;
        };
        let line = line_of(ty);
        self.builder.start_node(NodeKind::Type, line);
        let name = self.type_name(ty);
        self.builder.qualified(&name, line);
        if ty.kind() == "array_type" {
            self.builder.leaf(NodeKind::ArrayDeclarator, line);
        }
        self.builder.finish_node();
    }

    fn name_of(&mut self, node: Option<TsNode<'_>>, line: usize) {
        let (name, line) = node.map_or(("", line), |n| (self.text(n), line_of(n)));
        self.builder.ident(name, line);
    }

    fn package(&mut self, node: TsNode<'_>) {
        let Some(name) = named(node)
            .into_iter()
            .find(|c| matches!(c.kind(), "identifier" | "scoped_identifier"))
        else {
            return;
        };
        let line = line_of(node);
        let name = self.type_name(name);
        self.builder.start_node(NodeKind::PackageDef, line);
        self.builder.qualified(&name, line);
        self.builder.finish_node();
    }

    fn import(&mut self, node: TsNode<'_>) {
        let mut is_static = false;
        let mut wildcard = false;
        let mut name = None;

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "static" => is_static = true,
                "asterisk" => wildcard = true,
                "identifier" | "scoped_identifier" => name = Some(self.type_name(child)),
                _ => {}
            }
        }

        let Some(mut name) = name else {
            return;
        };
        if wildcard {
            name.push_str(".*");
        }

        let line = line_of(node);
        let kind = if is_static {
            NodeKind::StaticImport
        } else {
            NodeKind::Import
        };
        self.builder.start_node(kind, line);
        self.builder.qualified(&name, line);
        self.builder.finish_node();
    }

    fn modifiers(&mut self, decl: TsNode<'_>) {
        match named(decl).into_iter().find(|c| c.kind() == "modifiers") {
            Some(list) => self.modifier_list(list),
            None => {
                self.builder.leaf(NodeKind::Modifiers, line_of(decl));
            }
        }
    }

    fn modifier_list(&mut self, list: TsNode<'_>) {
        self.builder.start_node(NodeKind::Modifiers, line_of(list));
        let mut cursor = list.walk();
        for child in list.children(&mut cursor) {
            match child.kind() {
                "annotation" | "marker_annotation" => self.annotation(child),
                _ if !child.is_named() => {
                    let keyword = self.text(child);
                    self.builder.token(NodeKind::Modifier, keyword, line_of(child));
                }
                _ => {}
            }
        }
        self.builder.finish_node();
    }

    fn annotation(&mut self, node: TsNode<'_>) {
        let line = line_of(node);
        self.builder.start_node(NodeKind::Annotation, line);
        if let Some(name) = node.child_by_field_name("name") {
            let name = self.type_name(name);
            self.builder.qualified(&name, line);
        }
        if let Some(arguments) = node.child_by_field_name("arguments") {
            for argument in named(arguments) {
                if is_comment(argument) {
                    continue;
                }
                if argument.kind() != "element_value_pair" {
                    self.expr(argument);
                    continue;
                }
                let pair_line = line_of(argument);
                self.builder
                    .start_node(NodeKind::AnnotationMemberValuePair, pair_line);
                self.name_of(argument.child_by_field_name("key"), pair_line);
                self.builder.leaf(NodeKind::Assign, pair_line);
                if let Some(value) = argument.child_by_field_name("value") {
                    self.expr(value);
                }
                self.builder.finish_node();
            }
        }
        self.builder.finish_node();
    }

    fn type_declaration(&mut self, node: TsNode<'_>, kind: NodeKind) {
        let line = line_of(node);
        if node.kind() == "record_declaration" {
            self.builder.start_node_with_text(kind, "record", line);
        } else {
            self.builder.start_node(kind, line);
        }
        self.modifiers(node);
        self.name_of(node.child_by_field_name("name"), line);

        for child in named(node) {
            match child.kind() {
                "superclass" | "extends_interfaces" => {
                    self.clause(NodeKind::ExtendsClause, child);
                }
                "super_interfaces" => self.clause(NodeKind::ImplementsClause, child),
                _ => {}
            }
        }

        let components = if node.kind() == "record_declaration" {
            node.child_by_field_name("parameters")
        } else {
            None
        };
        match node.child_by_field_name("body") {
            Some(body) => self.body(body, components),
            None => {
                self.builder.leaf(NodeKind::ObjBlock, line);
            }
        }
        self.builder.finish_node();
    }

    fn clause(&mut self, kind: NodeKind, node: TsNode<'_>) {
        let line = line_of(node);
        self.builder.start_node(kind, line);
        for child in named(node) {
            let types = if child.kind() == "type_list" {
                named(child)
            } else {
                vec![child]
            };
            for ty in types.into_iter().filter(|t| !is_comment(*t)) {
                let name = self.type_name(ty);
                self.builder.qualified(&name, line_of(ty));
            }
        }
        self.builder.finish_node();
    }

    fn body(&mut self, body: TsNode<'_>, components: Option<TsNode<'_>>) {
        self.builder.start_node(NodeKind::ObjBlock, line_of(body));
        if let Some(components) = components {
            for component in named(components) {
                if component.kind() == "formal_parameter" {
                    self.declaration(NodeKind::VariableDef, component);
                }
            }
        }
        for member in named(body) {
            if member.kind() == "enum_body_declarations" {
                for inner in named(member) {
                    self.lower(inner);
                }
            } else {
                self.lower(member);
            }
        }
        self.builder.finish_node();
    }

    fn variables(&mut self, node: TsNode<'_>) {
        let ty = node.child_by_field_name("type");
        let mut cursor = node.walk();
        let declarators: Vec<_> = node
            .children_by_field_name("declarator", &mut cursor)
            .collect();

        for declarator in declarators {
            let line = line_of(declarator);
            self.builder.start_node(NodeKind::VariableDef, line);
            self.modifiers(node);
            self.type_ref(ty, line);
            self.name_of(declarator.child_by_field_name("name"), line);
            if declarator.child_by_field_name("dimensions").is_some() {
                self.builder.leaf(NodeKind::ArrayDeclarator, line);
            }
            if let Some(value) = declarator.child_by_field_name("value") {
                self.initializer(declarator, value);
            }
            self.builder.finish_node();
        }
    }

    /// `ASSIGN(EXPR(value))`, or `ASSIGN(ARRAY_INIT ..)` for `{..}` initializers.
    fn initializer(&mut self, declarator: TsNode<'_>, value: TsNode<'_>) {
        let mut cursor = declarator.walk();
        let line = declarator
            .children(&mut cursor)
            .find(|c| c.kind() == "=")
            .map_or_else(|| line_of(value), line_of);

        self.builder.start_node(NodeKind::Assign, line);
        if value.kind() == "array_initializer" {
            self.lower(value);
        } else {
            self.expr(value);
        }
        self.builder.finish_node();
    }

    /// `MODIFIERS, TYPE, IDENT` under a definition of `kind`.
    fn declaration(&mut self, kind: NodeKind, node: TsNode<'_>) {
        let line = line_of(node);
        self.builder.start_node(kind, line);
        self.modifiers(node);
        self.type_ref(node.child_by_field_name("type"), line);
        self.name_of(node.child_by_field_name("name"), line);
        if node.child_by_field_name("dimensions").is_some() {
            self.builder.leaf(NodeKind::ArrayDeclarator, line);
        }
        self.builder.finish_node();
    }

    fn method(&mut self, node: TsNode<'_>) {
        let line = line_of(node);
        self.builder.start_node(NodeKind::MethodDef, line);
        self.modifiers(node);
        self.type_ref(node.child_by_field_name("type"), line);
        self.name_of(node.child_by_field_name("name"), line);
        self.parameters(node.child_by_field_name("parameters"), line);
        if let Some(body) = node.child_by_field_name("body") {
            self.lower(body);
        }
        self.builder.finish_node();
    }

    fn constructor(&mut self, node: TsNode<'_>) {
        let line = line_of(node);
        self.builder.start_node(NodeKind::CtorDef, line);
        self.modifiers(node);
        self.name_of(node.child_by_field_name("name"), line);
        self.parameters(node.child_by_field_name("parameters"), line);
        if let Some(body) = node.child_by_field_name("body") {
            self.lower(body);
        }
        self.builder.finish_node();
    }

    fn parameters(&mut self, node: Option<TsNode<'_>>, line: usize) {
        let Some(list) = node else {
            self.builder.leaf(NodeKind::Parameters, line);
            return;
        };
        self.builder.start_node(NodeKind::Parameters, line_of(list));
        for param in named(list) {
            if matches!(param.kind(), "formal_parameter" | "spread_parameter") {
                self.parameter(param);
            }
        }
        self.builder.finish_node();
    }

    fn parameter(&mut self, node: TsNode<'_>) {
        let line = line_of(node);
        let (ty, name) = match node.kind() {
            "spread_parameter" => {
                let parts = named(node);
                let ty = parts
                    .iter()
                    .copied()
                    .find(|c| !matches!(c.kind(), "modifiers" | "variable_declarator"));
                let name = parts
                    .iter()
                    .find(|c| c.kind() == "variable_declarator")
                    .and_then(|d| d.child_by_field_name("name"));
                (ty, name)
            }
            "catch_formal_parameter" => (
                named(node).into_iter().find(|c| c.kind() == "catch_type"),
                node.child_by_field_name("name"),
            ),
            _ => (
                node.child_by_field_name("type"),
                node.child_by_field_name("name"),
            ),
        };

        self.builder.start_node(NodeKind::ParameterDef, line);
        self.modifiers(node);
        self.type_ref(ty, line);
        self.name_of(name, line);
        self.builder.finish_node();
    }

    /// Lambda parameter written without a type.
    fn inferred_parameter(&mut self, ident: TsNode<'_>) {
        let line = line_of(ident);
        self.builder.start_node(NodeKind::ParameterDef, line);
        self.builder.leaf(NodeKind::Modifiers, line);
        self.builder.leaf(NodeKind::Type, line);
        self.name_of(Some(ident), line);
        self.builder.finish_node();
    }

    fn resource(&mut self, node: TsNode<'_>) {
        let Some(name) = node.child_by_field_name("name") else {
            self.nest(NodeKind::Other, node);
            return;
        };
        let line = line_of(node);
        self.builder.start_node(NodeKind::VariableDef, line);
        self.modifiers(node);
        self.type_ref(node.child_by_field_name("type"), line);
        self.name_of(Some(name), line);
        if let Some(value) = node.child_by_field_name("value") {
            self.initializer(node, value);
        }
        self.builder.finish_node();
    }

    fn for_each(&mut self, node: TsNode<'_>) {
        let line = line_of(node);
        self.builder.start_node(NodeKind::ForEach, line);

        self.builder.start_node(NodeKind::VariableDef, line);
        self.modifiers(node);
        self.type_ref(node.child_by_field_name("type"), line);
        self.name_of(node.child_by_field_name("name"), line);
        self.builder.finish_node();

        if let Some(value) = node.child_by_field_name("value") {
            self.expr(value);
        }
        if let Some(body) = node.child_by_field_name("body") {
            self.lower(body);
        }
        self.builder.finish_node();
    }

    fn lambda(&mut self, node: TsNode<'_>) {
        let line = line_of(node);
        self.builder.start_node(NodeKind::Lambda, line);

        match node.child_by_field_name("parameters") {
            Some(single) if single.kind() == "identifier" => {
                self.builder.start_node(NodeKind::Parameters, line);
                self.inferred_parameter(single);
                self.builder.finish_node();
            }
            Some(inferred) if inferred.kind() == "inferred_parameters" => {
                self.builder.start_node(NodeKind::Parameters, line);
                for ident in named(inferred) {
                    if ident.kind() == "identifier" {
                        self.inferred_parameter(ident);
                    }
                }
                self.builder.finish_node();
            }
            formal => self.parameters(formal, line),
        }

        match node.child_by_field_name("body") {
            Some(block) if block.kind() == "block" => self.lower(block),
            Some(body) => self.expr(body),
            None => {}
        }
        self.builder.finish_node();
    }

    fn assignment(&mut self, node: TsNode<'_>) {
        let line = line_of(node);
        let operator = node
            .child_by_field_name("operator")
            .map_or("=", |op| self.text(op));
        if operator == "=" {
            self.builder.start_node(NodeKind::Assign, line);
        } else {
            self.builder
                .start_node_with_text(NodeKind::Operator, operator, line);
        }
        if let Some(left) = node.child_by_field_name("left") {
            self.lower(left);
        }
        if let Some(right) = node.child_by_field_name("right") {
            self.lower(right);
        }
        self.builder.finish_node();
    }

    fn operator_text(&self, node: TsNode<'_>) -> &'s str {
        let operator = node.child_by_field_name("operator").or_else(|| {
            let mut cursor = node.walk();
            let first = node.children(&mut cursor).find(|c| !c.is_named());
            first
        });
        operator.map_or("", |op| self.text(op))
    }

    fn operator(&mut self, node: TsNode<'_>) {
        let operator = self.operator_text(node);
        self.builder
            .start_node_with_text(NodeKind::Operator, operator, line_of(node));
        for child in named(node) {
            self.lower(child);
        }
        self.builder.finish_node();
    }

    /// Lowers `a + b + c` (left-nested binary expressions) without recursing
    /// per operator. Every level becomes an `OPERATOR` whose first child is
    /// the level below it.
    fn binary_chain(&mut self, node: TsNode<'_>) {
        let mut spine = vec![node];
        let mut innermost = node;
        while let Some(left) = innermost
            .child_by_field_name("left")
            .filter(|left| left.kind() == "binary_expression")
        {
            spine.push(left);
            innermost = left;
        }

        for level in &spine {
            let operator = self.operator_text(*level);
            self.builder
                .start_node_with_text(NodeKind::Operator, operator, line_of(*level));
        }

        let mut inner: Option<TsNode<'_>> = None;
        for level in spine.into_iter().rev() {
            for child in named(level) {
                if Some(child) != inner {
                    self.lower(child);
                }
            }
            self.builder.finish_node();
            inner = Some(level);
        }
    }

    fn field_access(&mut self, node: TsNode<'_>) {
        match (
            node.child_by_field_name("object"),
            node.child_by_field_name("field"),
        ) {
            (Some(object), Some(field)) => {
                self.builder.start_node(NodeKind::Dot, line_of(node));
                self.lower(object);
                self.lower(field);
                self.builder.finish_node();
            }
            _ => self.nest(NodeKind::Other, node),
        }
    }

    fn method_call(&mut self, node: TsNode<'_>) {
        let line = line_of(node);
        self.builder.start_node(NodeKind::MethodCall, line);
        let name = node.child_by_field_name("name");
        match node.child_by_field_name("object") {
            Some(object) if name.is_some() => {
                self.builder.start_node(NodeKind::Dot, line);
                self.lower(object);
                self.name_of(name, line);
                self.builder.finish_node();
            }
            _ => self.name_of(name, line),
        }
        match node.child_by_field_name("arguments") {
            Some(arguments) => self.lower(arguments),
            None => {
                self.builder.leaf(NodeKind::Elist, line);
            }
        }
        self.builder.finish_node();
    }

    fn array_access(&mut self, node: TsNode<'_>) {
        match (
            node.child_by_field_name("array"),
            node.child_by_field_name("index"),
        ) {
            (Some(array), Some(index)) => {
                self.builder.start_node(NodeKind::IndexOp, line_of(node));
                self.lower(array);
                self.expr(index);
                self.builder.finish_node();
            }
            _ => self.nest(NodeKind::Other, node),
        }
    }

    fn creation(&mut self, node: TsNode<'_>) {
        let line = line_of(node);
        let ty = node.child_by_field_name("type");
        self.builder.start_node(NodeKind::New, line);
        self.type_ref(ty, line);
        for child in named(node) {
            if Some(child) != ty && !is_comment(child) {
                self.lower(child);
            }
        }
        self.builder.finish_node();
    }
}
