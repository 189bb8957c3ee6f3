//! Source frontends that build `Tree`s from real source text.
//!
//! The engine itself never parses: it consumes an already-built tree plus
//! a `Resolver`. A frontend is the adapter that produces that tree from a
//! concrete grammar. Java is the one frontend shipped here; additional
//! languages would sit alongside it as sibling modules.

pub mod java;

use thiserror::Error;

use crate::tree::TreeError;

/// Errors from turning source text into a `Tree`.
///
/// A `Syntax` error is per-file: a multi-file run reports it for that file
/// and keeps going.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("syntax error at {line}:{column}")]
    Syntax { line: usize, column: usize },
    #[error("parser unavailable: {0}")]
    Parser(String),
    #[error(transparent)]
    MalformedTree(#[from] TreeError),
}
