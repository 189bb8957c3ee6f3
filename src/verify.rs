//! Fix verification support.
//!
//! Byte-for-byte output comparison, then an idempotence pass: a fix must
//! fully resolve its own violation, and everything outside the edited
//! ranges — formatting, comments, imports — must survive untouched.
//! Exact equality is the contract, not semantic equivalence.

use thiserror::Error;

use crate::driver::{edits_of, Driver, FindingKind};
use crate::edit::{apply_edits, EditError};
use crate::frontend::{self, ParseError};
use crate::resolve::ImportResolver;
use crate::rules::RuleRegistry;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("rule {0} produced no fix for the input")]
    NoFix(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error("fixed output differs from expected\n--- expected\n{expected}\n--- actual\n{actual}")]
    OutputMismatch { expected: String, actual: String },
    #[error("fix is not idempotent: {remaining} finding(s) for rule {rule} after applying it")]
    NotIdempotent { rule: String, remaining: usize },
}

/// Run the driver on `input`, apply the named rule's edits, and check the
/// result against `expected` exactly. Then re-run the driver on the fixed
/// text and require zero findings for that rule.
pub fn verify_fix(
    registry: &RuleRegistry,
    rule_id: &str,
    input: &str,
    expected: &str,
) -> Result<(), VerifyError> {
    let tree = frontend::java::parse(input)?;
    let resolver = ImportResolver::from_tree(&tree);
    let findings = Driver::new(registry, &resolver).analyze(&tree);

    let edits = edits_of(&findings, Some(rule_id));
    if edits.is_empty() {
        return Err(VerifyError::NoFix(rule_id.to_string()));
    }

    let fixed = apply_edits(input, &edits)?;
    if fixed != expected {
        return Err(VerifyError::OutputMismatch {
            expected: expected.to_string(),
            actual: fixed,
        });
    }

    let fixed_tree = frontend::java::parse(&fixed)?;
    let fixed_resolver = ImportResolver::from_tree(&fixed_tree);
    let remaining = Driver::new(registry, &fixed_resolver)
        .analyze(&fixed_tree)
        .iter()
        .filter(|f| f.rule == rule_id && f.kind == FindingKind::Violation)
        .count();
    if remaining > 0 {
        return Err(VerifyError::NotIdempotent {
            rule: rule_id.to_string(),
            remaining,
        });
    }
    Ok(())
}
