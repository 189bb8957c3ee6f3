//! Text edit engine.
//!
//! Fixes are expressed as byte-range replacements over the original
//! source, never as tree mutations. `apply_edits` splices a whole edit set
//! in one pass: every byte outside an edited range survives verbatim,
//! overlapping edits are a hard error naming both offending rules, and
//! failure is atomic — no partial output.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A proposed replacement of one byte range with new text.
///
/// A zero-width range (`start == end`) is an insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    /// Start byte offset in the original source (inclusive).
    pub start: usize,
    /// End byte offset in the original source (exclusive).
    pub end: usize,
    /// Replacement text.
    pub replacement: String,
    /// Id of the rule that produced the edit; stamped by the driver,
    /// reported on conflict.
    #[serde(default)]
    pub rule: String,
}

impl Edit {
    pub fn replace(start: usize, end: usize, replacement: impl Into<String>) -> Self {
        Self {
            start,
            end,
            replacement: replacement.into(),
            rule: String::new(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::replace(at, at, text)
    }

    /// Attribute the edit to a rule.
    pub fn for_rule(mut self, rule: &str) -> Self {
        self.rule = rule.to_string();
        self
    }

    /// Length of the replaced range in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_insertion(&self) -> bool {
        self.start == self.end
    }
}

/// Identifies one edit in a conflict report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRef {
    pub rule: String,
    pub start: usize,
    pub end: usize,
}

impl EditRef {
    fn of(edit: &Edit) -> Self {
        Self {
            rule: edit.rule.clone(),
            start: edit.start,
            end: edit.end,
        }
    }
}

impl fmt::Display for EditRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = if self.rule.is_empty() {
            "<unattributed>"
        } else {
            &self.rule
        };
        write!(f, "{} at {}..{}", rule, self.start, self.end)
    }
}

/// Errors from applying an edit set.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    /// Two edits overlap. Never silently resolved; the caller picks one
    /// rule's fixes to run at a time.
    #[error("conflicting edits: {0} overlaps {1}")]
    ConflictingEdits(EditRef, EditRef),
    /// Range is inverted, past end of source, or splits a UTF-8 sequence.
    #[error("edit range {start}..{end} is not a valid range of the {len}-byte source")]
    InvalidRange { start: usize, end: usize, len: usize },
}

/// Splice a set of non-overlapping edits into the source.
///
/// Edits are sorted by start offset (stable, so equal-offset insertions
/// keep their given order); any edit starting before the previous edit's
/// end is a conflict. The splice is a single linear pass.
pub fn apply_edits(source: &str, edits: &[Edit]) -> Result<String, EditError> {
    if edits.is_empty() {
        return Ok(source.to_string());
    }

    let mut sorted: Vec<&Edit> = edits.iter().collect();
    sorted.sort_by_key(|e| e.start);

    for edit in &sorted {
        let valid = edit.start <= edit.end
            && edit.end <= source.len()
            && source.is_char_boundary(edit.start)
            && source.is_char_boundary(edit.end);
        if !valid {
            return Err(EditError::InvalidRange {
                start: edit.start,
                end: edit.end,
                len: source.len(),
            });
        }
    }

    for pair in sorted.windows(2) {
        if pair[1].start < pair[0].end {
            return Err(EditError::ConflictingEdits(
                EditRef::of(pair[0]),
                EditRef::of(pair[1]),
            ));
        }
    }

    let grown: usize = sorted.iter().map(|e| e.replacement.len()).sum();
    let mut out = String::with_capacity(source.len() + grown);
    let mut cursor = 0;
    for edit in sorted {
        out.push_str(&source[cursor..edit.start]);
        out.push_str(&edit.replacement);
        cursor = edit.end;
    }
    out.push_str(&source[cursor..]);
    Ok(out)
}
