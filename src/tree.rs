//! Immutable syntax tree over source text.
//!
//! A `Tree` is built once by a frontend (see `crate::frontend`) and is
//! read-only afterward. Nodes live in an arena owned by the tree and are
//! addressed by `NodeId` handles. Rewrites never touch the tree: fixes
//! operate on byte ranges over the original source (see `crate::edit`),
//! so the tree's invariants never need re-validation mid-pass.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Source location span with byte offsets and line/column positions.
///
/// Byte offsets are half-open (`start_byte..end_byte`); lines and columns
/// are 1-indexed for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start_byte: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end_byte: usize,
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed).
    pub start_col: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// End column (1-indexed).
    pub end_col: usize,
}

impl Span {
    /// Whether `other` lies fully within this span.
    pub fn contains(&self, other: &Span) -> bool {
        self.start_byte <= other.start_byte && other.end_byte <= self.end_byte
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end_byte - self.start_byte
    }

    /// Whether the span covers zero bytes.
    pub fn is_empty(&self) -> bool {
        self.start_byte == self.end_byte
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// Kind tag for a syntax node.
///
/// A closed set: frontends map their grammar's node types onto these tags,
/// folding anything without an engine-level meaning into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    CompilationUnit,
    PackageDeclaration,
    ImportDeclaration,
    ClassDeclaration,
    MethodDeclaration,
    FieldDeclaration,
    VariableDeclaration,
    MethodInvocation,
    ObjectCreation,
    ArgumentList,
    BinaryExpression,
    Operator,
    TypeReference,
    Identifier,
    Literal,
    Block,
    Other,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::CompilationUnit => "compilation_unit",
            NodeKind::PackageDeclaration => "package_declaration",
            NodeKind::ImportDeclaration => "import_declaration",
            NodeKind::ClassDeclaration => "class_declaration",
            NodeKind::MethodDeclaration => "method_declaration",
            NodeKind::FieldDeclaration => "field_declaration",
            NodeKind::VariableDeclaration => "variable_declaration",
            NodeKind::MethodInvocation => "method_invocation",
            NodeKind::ObjectCreation => "object_creation",
            NodeKind::ArgumentList => "argument_list",
            NodeKind::BinaryExpression => "binary_expression",
            NodeKind::Operator => "operator",
            NodeKind::TypeReference => "type_reference",
            NodeKind::Identifier => "identifier",
            NodeKind::Literal => "literal",
            NodeKind::Block => "block",
            NodeKind::Other => "other",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Handle to a node in a `Tree`.
///
/// Only meaningful for the tree that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Arena slot for a single node.
#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    span: Span,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Violations of the tree's structural invariants, caught at build time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("tree has no nodes")]
    Empty,
    #[error("child span {child} escapes parent span {parent}")]
    ChildOutsideParent { parent: Span, child: Span },
    #[error("sibling spans out of order at {at}")]
    UnorderedSiblings { at: Span },
}

/// An immutable, parent-linked syntax tree over one source text.
#[derive(Debug)]
pub struct Tree {
    source: String,
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Tree {
    /// The root node (always a `CompilationUnit` for frontend-built trees).
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The full original source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn kind(&self, node: NodeId) -> NodeKind {
        self.nodes[node.index()].kind
    }

    pub fn span(&self, node: NodeId) -> Span {
        self.nodes[node.index()].span
    }

    /// Parent relation; `None` only for the root.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.index()].parent
    }

    /// Children in source order.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.index()].children
    }

    /// Slice of the original source covered by the node.
    pub fn text_of(&self, node: NodeId) -> &str {
        let span = self.span(node);
        &self.source[span.start_byte..span.end_byte]
    }

    /// First child with the given kind, if any.
    pub fn child_of_kind(&self, node: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .find(|c| self.kind(*c) == kind)
    }

    /// All nodes of a given kind, in pre-order.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<NodeId> {
        self.preorder().filter(|n| self.kind(*n) == kind).collect()
    }

    /// Stable pre-order traversal of the whole tree.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: vec![self.root],
        }
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Iterator over a tree in stable pre-order.
pub struct Preorder<'t> {
    tree: &'t Tree,
    stack: Vec<NodeId>,
}

impl Iterator for Preorder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.stack.pop()?;
        // Push children reversed so the leftmost child pops first.
        for child in self.tree.children(node).iter().rev() {
            self.stack.push(*child);
        }
        Some(node)
    }
}

/// Incremental constructor for a `Tree`.
///
/// Frontends append nodes in pre-order (parent before child, siblings left
/// to right); `build` validates containment and sibling ordering before
/// handing out the immutable tree.
pub struct TreeBuilder {
    source: String,
    nodes: Vec<NodeData>,
}

impl TreeBuilder {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            nodes: Vec::new(),
        }
    }

    /// Append a node. The first node added becomes the root and must have
    /// no parent.
    pub fn add_node(&mut self, kind: NodeKind, span: Span, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind,
            span,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.index()].children.push(id);
        }
        id
    }

    /// Validate invariants and freeze the tree.
    pub fn build(self) -> Result<Tree, TreeError> {
        if self.nodes.is_empty() {
            return Err(TreeError::Empty);
        }
        for data in &self.nodes {
            let mut prev_end: Option<usize> = None;
            for child in &data.children {
                let child_span = self.nodes[child.index()].span;
                if !data.span.contains(&child_span) {
                    return Err(TreeError::ChildOutsideParent {
                        parent: data.span,
                        child: child_span,
                    });
                }
                if let Some(end) = prev_end {
                    if child_span.start_byte < end {
                        return Err(TreeError::UnorderedSiblings { at: child_span });
                    }
                }
                prev_end = Some(child_span.end_byte);
            }
        }
        Ok(Tree {
            source: self.source,
            nodes: self.nodes,
            root: NodeId(0),
        })
    }
}
