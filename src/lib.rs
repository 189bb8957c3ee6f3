//! fixcheck - rule-based bug pattern checker with deterministic auto-fixes.
//!
//! fixcheck evaluates a registry of declarative bug-pattern rules against
//! an immutable syntax tree and either reports findings or rewrites the
//! offending source ranges. Everything outside an edited range survives
//! byte for byte; overlapping fixes are a reported conflict, never a
//! silent choice.
//!
//! # Architecture
//!
//! - `tree`: immutable, parent-linked syntax tree with byte spans
//! - `frontend`: tree-sitter adapters producing trees (Java shipped)
//! - `resolve`: symbol resolution seam (`Resolver`) plus the heuristic
//!   import-based implementation
//! - `matcher`: composable, short-circuiting node predicates
//! - `rules`: rule definitions, the registry, and the built-in rule set
//! - `driver`: single-pass analysis with per-rule fault isolation
//! - `edit`: conflict-checked splicing of text edits
//! - `verify`: test support asserting byte-exact, idempotent fixes
//! - `suppress`: inline `fixcheck:ignore` comments
//! - `config`: `fixcheck.yaml` rule settings and file globs
//! - `report`: pretty and JSON output
//!
//! # Adding a Rule
//!
//! Compose a trigger from `Matcher` primitives, write the fix as edits
//! over the node's span, and register it; see `src/rules/builtin.rs` for
//! the shipped examples.

pub mod cli;
pub mod config;
pub mod driver;
pub mod edit;
pub mod frontend;
pub mod matcher;
pub mod report;
pub mod resolve;
pub mod rules;
pub mod suppress;
pub mod tree;
pub mod verify;

pub use driver::{edits_of, Driver, Finding, FindingKind};
pub use edit::{apply_edits, Edit, EditError};
pub use frontend::ParseError;
pub use matcher::Matcher;
pub use resolve::{ImportResolver, Resolver, SymbolRef};
pub use rules::{Rule, RuleRegistry, RegistryError, Severity};
pub use tree::{NodeId, NodeKind, Span, Tree, TreeBuilder};
pub use verify::{verify_fix, VerifyError};
