//! Rule definitions and the rule registry.

pub mod builtin;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::edit::Edit;
use crate::matcher::Matcher;
use crate::tree::{NodeId, Tree};

/// Severity levels for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Fix generator: edits rewriting the violation at `node`.
///
/// One firing may return several edits (e.g. a replacement plus an import
/// insertion); they are applied in the same pass and must not overlap.
/// An empty vector means no fix for this particular site.
pub type FixFn = fn(&Tree, NodeId) -> Vec<Edit>;

/// A registered bug pattern: trigger, message, optional fix.
///
/// Immutable once registered.
pub struct Rule {
    /// Unique id, e.g. "sized-hashset-constructor".
    pub id: String,
    pub severity: Severity,
    /// Message template; `{text}` expands to the matched node's source
    /// text.
    pub message: String,
    pub trigger: Matcher,
    pub fix: Option<FixFn>,
}

impl Rule {
    pub fn new(
        id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        trigger: Matcher,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            message: message.into(),
            trigger,
            fix: None,
        }
    }

    pub fn with_fix(mut self, fix: FixFn) -> Self {
        self.fix = Some(fix);
        self
    }

    /// Render the message for a concrete match.
    pub fn render_message(&self, tree: &Tree, node: NodeId) -> String {
        self.message.replace("{text}", tree.text_of(node))
    }
}

/// Rule registration failures. Fatal at startup; a duplicate id is a
/// configuration error, not a runtime condition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate rule id: {0}")]
    DuplicateRuleId(String),
}

/// The set of rules one analysis run evaluates.
///
/// Built once before analysis and read-only afterward; shared by
/// reference across worker threads.
#[derive(Default)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
    index: HashMap<String, usize>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in rule set.
    pub fn with_builtin_rules() -> Self {
        let mut registry = Self::new();
        for rule in builtin::rules() {
            registry
                .register(rule)
                .expect("builtin rule ids are unique");
        }
        registry
    }

    pub fn register(&mut self, rule: Rule) -> Result<(), RegistryError> {
        if self.index.contains_key(&rule.id) {
            return Err(RegistryError::DuplicateRuleId(rule.id));
        }
        self.index.insert(rule.id.clone(), self.rules.len());
        self.rules.push(rule);
        Ok(())
    }

    pub fn lookup(&self, id: &str) -> Option<&Rule> {
        self.index.get(id).map(|i| &self.rules[*i])
    }

    /// All rules in registration order.
    pub fn all(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeKind;

    fn dummy_rule(id: &str) -> Rule {
        Rule::new(
            id,
            Severity::Warning,
            "test rule",
            Matcher::kind(NodeKind::Other),
        )
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = RuleRegistry::new();
        registry.register(dummy_rule("a")).unwrap();
        registry.register(dummy_rule("b")).unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.lookup("a").is_some());
        assert!(registry.lookup("missing").is_none());
        let ids: Vec<&str> = registry.all().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut registry = RuleRegistry::new();
        registry.register(dummy_rule("dup")).unwrap();
        let err = registry.register(dummy_rule("dup")).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateRuleId("dup".to_string()));
        // First registration survives.
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_builtin_rules_register_cleanly() {
        let registry = RuleRegistry::with_builtin_rules();
        assert!(!registry.is_empty());
        assert!(registry.lookup("sized-hashset-constructor").is_some());
    }
}
