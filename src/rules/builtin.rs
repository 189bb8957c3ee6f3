//! Built-in bug pattern rules.
//!
//! Each rule is data: a declarative trigger, a message, and (usually) a
//! fix function. The engine knows nothing about any of them.

use lazy_static::lazy_static;
use regex::Regex;

use crate::edit::Edit;
use crate::matcher::Matcher;
use crate::tree::{NodeId, NodeKind, Tree};

use super::{Rule, Severity};

lazy_static! {
    /// A double-quoted string literal, by source text.
    static ref STRING_LITERAL: Regex = Regex::new(r#"^".*"$"#).unwrap();
    /// The two reference-equality operators.
    static ref EQUALITY_OPERATOR: Regex = Regex::new(r"^(==|!=)$").unwrap();
}

/// The default rule set, in registration order.
pub fn rules() -> Vec<Rule> {
    vec![
        sized_hashset_constructor(),
        boxed_primitive_constructor(),
        string_reference_equality(),
        system_exit(),
    ]
}

/// `new HashSet<>(n)` sizes by capacity, not expected elements;
/// `Sets.newHashSetWithExpectedSize(n)` says what the caller meant.
fn sized_hashset_constructor() -> Rule {
    Rule::new(
        "sized-hashset-constructor",
        Severity::Warning,
        "HashSet's int constructor sets capacity, not expected size; \
         use Sets.newHashSetWithExpectedSize",
        Matcher::kind(NodeKind::ObjectCreation)
            .and(Matcher::symbol_with_arity("java.util.HashSet", 1))
            .and(Matcher::argument_at(0, Matcher::kind(NodeKind::Literal))),
    )
    .with_fix(fix_sized_hashset)
}

fn fix_sized_hashset(tree: &Tree, node: NodeId) -> Vec<Edit> {
    let Some(args) = tree.child_of_kind(node, NodeKind::ArgumentList) else {
        return Vec::new();
    };
    let Some(size) = tree.children(args).first() else {
        return Vec::new();
    };
    let span = tree.span(node);
    let mut edits = vec![Edit::replace(
        span.start_byte,
        span.end_byte,
        format!("Sets.newHashSetWithExpectedSize({})", tree.text_of(*size)),
    )];
    if let Some(import) = insert_import(tree, "com.google.common.collect.Sets") {
        edits.push(import);
    }
    edits
}

/// Boxed primitive constructors are deprecated; `valueOf` caches small
/// values.
fn boxed_primitive_constructor() -> Rule {
    Rule::new(
        "boxed-primitive-constructor",
        Severity::Error,
        "boxed primitive constructor `{text}`; use valueOf",
        Matcher::kind(NodeKind::ObjectCreation).and(Matcher::any_of(vec![
            Matcher::symbol_with_arity("java.lang.Integer", 1),
            Matcher::symbol_with_arity("java.lang.Long", 1),
            Matcher::symbol_with_arity("java.lang.Double", 1),
        ])),
    )
    .with_fix(fix_boxed_primitive)
}

fn fix_boxed_primitive(tree: &Tree, node: NodeId) -> Vec<Edit> {
    let Some(ty) = tree.child_of_kind(node, NodeKind::TypeReference) else {
        return Vec::new();
    };
    let Some(args) = tree.child_of_kind(node, NodeKind::ArgumentList) else {
        return Vec::new();
    };
    let Some(value) = tree.children(args).first() else {
        return Vec::new();
    };
    let span = tree.span(node);
    vec![Edit::replace(
        span.start_byte,
        span.end_byte,
        format!("{}.valueOf({})", tree.text_of(ty), tree.text_of(*value)),
    )]
}

/// `==`/`!=` against a string literal compares references, not contents.
fn string_reference_equality() -> Rule {
    let string_literal = || {
        Matcher::kind(NodeKind::Literal)
            .and(Matcher::text_matches(STRING_LITERAL.clone()))
    };
    Rule::new(
        "string-reference-equality",
        Severity::Error,
        "`{text}` compares string references; use equals()",
        Matcher::kind(NodeKind::BinaryExpression)
            .and(Matcher::child_at(
                1,
                Matcher::kind(NodeKind::Operator)
                    .and(Matcher::text_matches(EQUALITY_OPERATOR.clone())),
            ))
            .and(Matcher::any_of(vec![
                Matcher::child_at(0, string_literal()),
                Matcher::child_at(2, string_literal()),
            ])),
    )
    .with_fix(fix_string_equality)
}

fn fix_string_equality(tree: &Tree, node: NodeId) -> Vec<Edit> {
    let children = tree.children(node);
    let [lhs, op, rhs] = children else {
        return Vec::new();
    };
    // No fix for `!=`, and no fix when the receiver would need extra
    // parentheses.
    if tree.text_of(*op) != "=="
        || !matches!(
            tree.kind(*lhs),
            NodeKind::Identifier | NodeKind::Literal
        )
    {
        return Vec::new();
    }
    let span = tree.span(node);
    vec![Edit::replace(
        span.start_byte,
        span.end_byte,
        format!("{}.equals({})", tree.text_of(*lhs), tree.text_of(*rhs)),
    )]
}

/// `System.exit` in library code kills the host JVM.
fn system_exit() -> Rule {
    Rule::new(
        "system-exit",
        Severity::Warning,
        "System.exit aborts the JVM without unwinding; return a status to the caller",
        Matcher::kind(NodeKind::MethodInvocation)
            .and(Matcher::symbol("java.lang.System.exit")),
    )
}

/// Insertion edit adding `import <fqn>;` after the existing imports, or
/// `None` when an existing import already covers it (keeps fixes
/// idempotent).
fn insert_import(tree: &Tree, fqn: &str) -> Option<Edit> {
    let package = fqn.rsplit_once('.').map(|(p, _)| p).unwrap_or("");
    let mut last_import_end = None;
    let mut package_end = None;

    for child in tree.children(tree.root()) {
        match tree.kind(*child) {
            NodeKind::ImportDeclaration => {
                let path = tree
                    .text_of(*child)
                    .trim_start_matches("import")
                    .trim_start()
                    .trim_start_matches("static")
                    .trim()
                    .trim_end_matches(';')
                    .trim()
                    .to_string();
                if path == fqn {
                    return None;
                }
                if let Some(wildcard) = path.strip_suffix(".*") {
                    if wildcard == package {
                        return None;
                    }
                }
                last_import_end = Some(tree.span(*child).end_byte);
            }
            NodeKind::PackageDeclaration => {
                package_end = Some(tree.span(*child).end_byte);
            }
            _ => {}
        }
    }

    let edit = match (last_import_end, package_end) {
        (Some(end), _) => Edit::insert(end, format!("\nimport {fqn};")),
        (None, Some(end)) => Edit::insert(end, format!("\n\nimport {fqn};")),
        (None, None) => Edit::insert(0, format!("import {fqn};\n\n")),
    };
    Some(edit)
}
