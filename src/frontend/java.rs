//! Java frontend built on tree-sitter.
//!
//! Maps the tree-sitter-java grammar onto the engine's closed `NodeKind`
//! set. Only named grammar nodes are kept, with one exception: the
//! operator token of a binary expression is materialized as an `Operator`
//! node so matchers can tell `==` from `!=`.

use tree_sitter::{Node, Parser};

use super::ParseError;
use crate::tree::{NodeId, NodeKind, Span, Tree, TreeBuilder};

/// Parse Java source into an engine tree.
///
/// Fails with `ParseError::Syntax` at the first error node when the input
/// is malformed; a partially recovered tree is never returned.
pub fn parse(source: &str) -> Result<Tree, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_java::LANGUAGE.into())
        .map_err(|e| ParseError::Parser(e.to_string()))?;

    let ts_tree = parser
        .parse(source, None)
        .ok_or_else(|| ParseError::Parser("tree-sitter returned no tree".to_string()))?;

    let root = ts_tree.root_node();
    if root.has_error() {
        let (line, column) = first_error_position(root);
        return Err(ParseError::Syntax { line, column });
    }

    let mut builder = TreeBuilder::new(source);
    let root_id = builder.add_node(NodeKind::CompilationUnit, span_of(root), None);
    add_children(&mut builder, root, root_id);
    Ok(builder.build()?)
}

fn span_of(node: Node) -> Span {
    let start = node.start_position();
    let end = node.end_position();
    Span {
        start_byte: node.start_byte(),
        end_byte: node.end_byte(),
        // tree-sitter positions are 0-indexed
        start_line: start.row + 1,
        start_col: start.column + 1,
        end_line: end.row + 1,
        end_col: end.column + 1,
    }
}

/// Position of the first ERROR or missing node, for the syntax error report.
fn first_error_position(root: Node) -> (usize, usize) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let pos = node.start_position();
            return (pos.row + 1, pos.column + 1);
        }
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        for child in children.into_iter().rev() {
            stack.push(child);
        }
    }
    (1, 1)
}

fn add_children(builder: &mut TreeBuilder, ts_node: Node, parent: NodeId) {
    let parent_is_binary = ts_node.kind() == "binary_expression";
    let mut cursor = ts_node.walk();
    let children: Vec<Node> = ts_node.children(&mut cursor).collect();
    for child in children {
        let kind = if child.is_named() {
            map_kind(child.kind())
        } else if parent_is_binary {
            // The only unnamed child of a binary expression is its operator.
            NodeKind::Operator
        } else {
            continue;
        };
        let id = builder.add_node(kind, span_of(child), Some(parent));
        add_children(builder, child, id);
    }
}

/// Fold tree-sitter-java node types into the engine's kind set.
fn map_kind(ts_kind: &str) -> NodeKind {
    match ts_kind {
        "package_declaration" => NodeKind::PackageDeclaration,
        "import_declaration" => NodeKind::ImportDeclaration,
        "class_declaration" | "interface_declaration" | "enum_declaration"
        | "record_declaration" => NodeKind::ClassDeclaration,
        "method_declaration" | "constructor_declaration" => NodeKind::MethodDeclaration,
        "field_declaration" => NodeKind::FieldDeclaration,
        "local_variable_declaration" => NodeKind::VariableDeclaration,
        "method_invocation" => NodeKind::MethodInvocation,
        "object_creation_expression" => NodeKind::ObjectCreation,
        "argument_list" => NodeKind::ArgumentList,
        "binary_expression" => NodeKind::BinaryExpression,
        "type_identifier" | "generic_type" | "scoped_type_identifier" | "array_type"
        | "integral_type" | "floating_point_type" | "boolean_type" | "void_type" => {
            NodeKind::TypeReference
        }
        "identifier" | "scoped_identifier" | "field_access" => NodeKind::Identifier,
        "decimal_integer_literal"
        | "hex_integer_literal"
        | "octal_integer_literal"
        | "binary_integer_literal"
        | "decimal_floating_point_literal"
        | "hex_floating_point_literal"
        | "string_literal"
        | "character_literal"
        | "true"
        | "false"
        | "null_literal" => NodeKind::Literal,
        "block" | "constructor_body" | "class_body" | "interface_body" | "enum_body" => {
            NodeKind::Block
        }
        _ => NodeKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_class() {
        let tree = parse("class A { void f() { g(1); } }").unwrap();
        assert_eq!(tree.kind(tree.root()), NodeKind::CompilationUnit);
        assert_eq!(tree.nodes_of_kind(NodeKind::ClassDeclaration).len(), 1);
        assert_eq!(tree.nodes_of_kind(NodeKind::MethodDeclaration).len(), 1);
        assert_eq!(tree.nodes_of_kind(NodeKind::MethodInvocation).len(), 1);
    }

    #[test]
    fn test_spans_cover_source_text() {
        let src = "class A { int x = 42; }";
        let tree = parse(src).unwrap();
        let literals = tree.nodes_of_kind(NodeKind::Literal);
        assert_eq!(literals.len(), 1);
        assert_eq!(tree.text_of(literals[0]), "42");
        assert_eq!(tree.text_of(tree.root()), src);
    }

    #[test]
    fn test_binary_operator_is_materialized() {
        let tree = parse("class A { boolean b = \"x\" == \"y\"; }").unwrap();
        let binaries = tree.nodes_of_kind(NodeKind::BinaryExpression);
        assert_eq!(binaries.len(), 1);
        let children = tree.children(binaries[0]);
        assert_eq!(children.len(), 3);
        assert_eq!(tree.kind(children[1]), NodeKind::Operator);
        assert_eq!(tree.text_of(children[1]), "==");
    }

    #[test]
    fn test_object_creation_shape() {
        let src = "import java.util.HashSet;\nclass A { Object s = new HashSet<>(10); }";
        let tree = parse(src).unwrap();
        let creations = tree.nodes_of_kind(NodeKind::ObjectCreation);
        assert_eq!(creations.len(), 1);
        let node = creations[0];
        assert!(tree.child_of_kind(node, NodeKind::TypeReference).is_some());
        let args = tree.child_of_kind(node, NodeKind::ArgumentList).unwrap();
        assert_eq!(tree.children(args).len(), 1);
    }

    #[test]
    fn test_syntax_error_reports_position() {
        let err = parse("class A { void f( }").unwrap_err();
        match err {
            ParseError::Syntax { line, .. } => assert_eq!(line, 1),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }
}
