//! Inline suppression of findings via comments.
//!
//! Supports suppression comments like:
//! - `// fixcheck:ignore <rule> - <reason>`
//! - `// fixcheck:ignore-next-line <rule> - <reason>`
//! - `// fixcheck:ignore-file <rule> - <reason>` (file header only)
//!
//! `<rule>` is a rule id or `*` for all rules. Suppressed findings are
//! reported separately, never silently dropped — and their edits are
//! never applied.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::driver::Finding;

/// How a suppression applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuppressionScope {
    /// Applies to the same line.
    Line,
    /// Applies to the next line.
    NextLine,
    /// Applies to the entire file.
    File,
}

/// An inline suppression directive.
#[derive(Debug, Clone, Serialize)]
pub struct Suppression {
    /// Rule id to suppress, or "*" for all.
    pub rule: String,
    /// Human-readable reason.
    pub reason: String,
    /// Line number (0 for file-level).
    pub line: usize,
    pub scope: SuppressionScope,
}

/// A finding that was suppressed, with the directive that did it.
#[derive(Debug, Clone, Serialize)]
pub struct SuppressedFinding {
    pub finding: Finding,
    pub suppression: Suppression,
}

/// File-level directives must sit in the file header.
const FILE_DIRECTIVE_MAX_LINE: usize = 10;

lazy_static! {
    /// Patterns for matching suppression comments (Java line and block
    /// style).
    static ref SUPPRESSION_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"//\s*fixcheck:(ignore(?:-file|-next-line)?)\s+(\S+)\s*(?:-\s*(.*))?").unwrap(),
        Regex::new(r"/\*\s*fixcheck:(ignore(?:-file|-next-line)?)\s+(\S+)\s*(?:-\s*(.*?))?\s*\*/").unwrap(),
    ];
}

/// Parse suppression directives from source text.
pub fn parse_suppressions(source: &str) -> Vec<Suppression> {
    let mut suppressions = Vec::new();

    for (line_num, line) in source.lines().enumerate() {
        let line_number = line_num + 1;

        for pattern in SUPPRESSION_PATTERNS.iter() {
            if let Some(caps) = pattern.captures(line) {
                let directive = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                let rule = caps.get(2).map(|m| m.as_str()).unwrap_or("");
                let reason = caps
                    .get(3)
                    .map(|m| m.as_str().trim().to_string())
                    .unwrap_or_default();

                let scope = match directive {
                    "ignore-file" => {
                        if line_number > FILE_DIRECTIVE_MAX_LINE {
                            continue;
                        }
                        SuppressionScope::File
                    }
                    "ignore-next-line" => SuppressionScope::NextLine,
                    "ignore" => {
                        // Trailing a statement: same line. Alone on its
                        // line: the code it refers to is below.
                        if let Some(m) = caps.get(0) {
                            if line[..m.start()].trim().is_empty() {
                                SuppressionScope::NextLine
                            } else {
                                SuppressionScope::Line
                            }
                        } else {
                            SuppressionScope::Line
                        }
                    }
                    _ => continue,
                };

                suppressions.push(Suppression {
                    rule: rule.to_string(),
                    reason,
                    line: if scope == SuppressionScope::File {
                        0
                    } else {
                        line_number
                    },
                    scope,
                });
                break; // Only one suppression per line
            }
        }
    }

    suppressions
}

/// Check if a finding matches a suppression.
pub fn matches_suppression(finding: &Finding, suppression: &Suppression) -> bool {
    if suppression.rule != "*" && suppression.rule != finding.rule {
        return false;
    }

    match suppression.scope {
        SuppressionScope::File => true,
        SuppressionScope::Line => finding.span.start_line == suppression.line,
        SuppressionScope::NextLine => finding.span.start_line == suppression.line + 1,
    }
}

/// Separate findings into active and suppressed.
pub fn filter_suppressed(
    findings: Vec<Finding>,
    suppressions: &[Suppression],
) -> (Vec<Finding>, Vec<SuppressedFinding>) {
    let mut active = Vec::new();
    let mut suppressed = Vec::new();

    for finding in findings {
        match suppressions
            .iter()
            .find(|s| matches_suppression(&finding, s))
        {
            Some(suppression) => suppressed.push(SuppressedFinding {
                finding,
                suppression: suppression.clone(),
            }),
            None => active.push(finding),
        }
    }

    (active, suppressed)
}
