//! Composable node predicates.
//!
//! A rule's trigger is a `Matcher`: a tagged-variant predicate tree
//! evaluated against one node plus the resolver. Combinators short-circuit
//! left to right, so a later operand may assume the shape an earlier one
//! established (e.g. check the kind before indexing into arguments).

use regex::Regex;

use crate::resolve::{argument_count, Resolver};
use crate::tree::{NodeId, NodeKind, Tree};

/// A boolean predicate over one tree node.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Node kind equals the tag.
    Kind(NodeKind),
    /// Resolved symbol has this fully-qualified name (and arity, when
    /// given).
    Symbol {
        qualified_name: String,
        arity: Option<usize>,
    },
    /// Resolved symbol names a subtype of the given type.
    SubtypeOf(String),
    /// The node's i-th call argument matches.
    ArgumentAt(usize, Box<Matcher>),
    /// The node's i-th child matches.
    ChildAt(usize, Box<Matcher>),
    /// Node is a literal with exactly this source text.
    LiteralValue(String),
    /// Node source text matches the regex.
    TextMatches(Regex),
    /// The node's call argument count equals n.
    ArgCount(usize),
    /// Every operand matches (short-circuits on the first false).
    All(Vec<Matcher>),
    /// At least one operand matches (short-circuits on the first true).
    Any(Vec<Matcher>),
    /// Operand does not match.
    Not(Box<Matcher>),
    /// Escape hatch for triggers the declarative primitives cannot
    /// express.
    Custom(fn(&Tree, NodeId) -> bool),
}

impl Matcher {
    pub fn kind(kind: NodeKind) -> Self {
        Matcher::Kind(kind)
    }

    pub fn symbol(qualified_name: impl Into<String>) -> Self {
        Matcher::Symbol {
            qualified_name: qualified_name.into(),
            arity: None,
        }
    }

    pub fn symbol_with_arity(qualified_name: impl Into<String>, arity: usize) -> Self {
        Matcher::Symbol {
            qualified_name: qualified_name.into(),
            arity: Some(arity),
        }
    }

    pub fn subtype_of(type_name: impl Into<String>) -> Self {
        Matcher::SubtypeOf(type_name.into())
    }

    pub fn argument_at(index: usize, matcher: Matcher) -> Self {
        Matcher::ArgumentAt(index, Box::new(matcher))
    }

    pub fn child_at(index: usize, matcher: Matcher) -> Self {
        Matcher::ChildAt(index, Box::new(matcher))
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Matcher::LiteralValue(value.into())
    }

    pub fn text_matches(regex: Regex) -> Self {
        Matcher::TextMatches(regex)
    }

    /// N-ary disjunction; this is how `anyOf(set)` is spelled.
    pub fn any_of(matchers: Vec<Matcher>) -> Self {
        Matcher::Any(matchers)
    }

    /// Conjunction, flattening when the receiver is already an `All`.
    pub fn and(self, other: Matcher) -> Self {
        match self {
            Matcher::All(mut operands) => {
                operands.push(other);
                Matcher::All(operands)
            }
            first => Matcher::All(vec![first, other]),
        }
    }

    /// Disjunction, flattening when the receiver is already an `Any`.
    pub fn or(self, other: Matcher) -> Self {
        match self {
            Matcher::Any(mut operands) => {
                operands.push(other);
                Matcher::Any(operands)
            }
            first => Matcher::Any(vec![first, other]),
        }
    }

    pub fn negate(self) -> Self {
        Matcher::Not(Box::new(self))
    }

    /// Evaluate against one node.
    pub fn matches(&self, tree: &Tree, node: NodeId, resolver: &dyn Resolver) -> bool {
        match self {
            Matcher::Kind(kind) => tree.kind(node) == *kind,
            Matcher::Symbol {
                qualified_name,
                arity,
            } => match resolver.resolve(tree, node) {
                Some(symbol) => {
                    symbol.qualified_name == *qualified_name
                        && arity.map_or(true, |a| symbol.arity == Some(a))
                }
                None => false,
            },
            Matcher::SubtypeOf(sup) => match resolver.resolve(tree, node) {
                Some(symbol) => resolver.is_subtype(&symbol.qualified_name, sup),
                None => false,
            },
            Matcher::ArgumentAt(index, matcher) => {
                match tree.child_of_kind(node, NodeKind::ArgumentList) {
                    Some(args) => match tree.children(args).get(*index) {
                        Some(arg) => matcher.matches(tree, *arg, resolver),
                        None => false,
                    },
                    None => false,
                }
            }
            Matcher::ChildAt(index, matcher) => match tree.children(node).get(*index) {
                Some(child) => matcher.matches(tree, *child, resolver),
                None => false,
            },
            Matcher::LiteralValue(value) => {
                tree.kind(node) == NodeKind::Literal && tree.text_of(node) == value
            }
            Matcher::TextMatches(regex) => regex.is_match(tree.text_of(node)),
            Matcher::ArgCount(n) => argument_count(tree, node) == *n,
            Matcher::All(operands) => operands.iter().all(|m| m.matches(tree, node, resolver)),
            Matcher::Any(operands) => operands.iter().any(|m| m.matches(tree, node, resolver)),
            Matcher::Not(operand) => !operand.matches(tree, node, resolver),
            Matcher::Custom(predicate) => predicate(tree, node),
        }
    }
}
