//! Single-pass analysis driver.
//!
//! One stable pre-order walk of the tree; at each node every registered
//! rule's trigger is evaluated in registration order. Rules are
//! independent: no rule observes another rule's findings within a pass,
//! so two runs over the same tree always agree byte for byte.
//!
//! A panicking trigger or fix is contained to a `RuleFailure` finding for
//! that rule at that node; one broken rule never aborts analysis of the
//! rest of the tree.

use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;

use crate::edit::Edit;
use crate::resolve::Resolver;
use crate::rules::{Rule, RuleRegistry, Severity};
use crate::tree::{NodeId, Span, Tree};

/// What a finding reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// The rule's trigger matched.
    Violation,
    /// The rule itself broke while evaluating this node.
    RuleFailure,
}

/// One rule firing (or failing) at one node.
///
/// Created during a pass, consumed by the report/fix step, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub rule: String,
    pub kind: FindingKind,
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    /// Proposed edits, stamped with the rule id. Empty when the rule has
    /// no fix for this site.
    pub edits: Vec<Edit>,
}

impl Finding {
    pub fn is_fixable(&self) -> bool {
        !self.edits.is_empty()
    }
}

/// Runs every registered rule over a tree in one pass.
pub struct Driver<'a> {
    registry: &'a RuleRegistry,
    resolver: &'a dyn Resolver,
}

impl<'a> Driver<'a> {
    pub fn new(registry: &'a RuleRegistry, resolver: &'a dyn Resolver) -> Self {
        Self { registry, resolver }
    }

    /// Analyze one tree. Stateless with respect to prior calls; findings
    /// come back in deterministic (node-major, rule-minor) order.
    pub fn analyze(&self, tree: &Tree) -> Vec<Finding> {
        let mut findings = Vec::new();
        for node in tree.preorder() {
            for rule in self.registry.all() {
                self.evaluate(tree, node, rule, &mut findings);
            }
        }
        findings
    }

    fn evaluate(&self, tree: &Tree, node: NodeId, rule: &Rule, findings: &mut Vec<Finding>) {
        let span = tree.span(node);

        let fired = panic::catch_unwind(AssertUnwindSafe(|| {
            rule.trigger.matches(tree, node, self.resolver)
        }));
        match fired {
            Ok(false) => return,
            Ok(true) => {}
            Err(_) => {
                findings.push(rule_failure(rule, span, "trigger"));
                return;
            }
        }

        let edits = match rule.fix {
            None => Vec::new(),
            Some(fix) => match panic::catch_unwind(AssertUnwindSafe(|| fix(tree, node))) {
                Ok(edits) => edits
                    .into_iter()
                    .map(|e| e.for_rule(&rule.id))
                    .collect(),
                Err(_) => {
                    findings.push(rule_failure(rule, span, "fix"));
                    return;
                }
            },
        };

        findings.push(Finding {
            rule: rule.id.clone(),
            kind: FindingKind::Violation,
            severity: rule.severity,
            message: rule.render_message(tree, node),
            span,
            edits,
        });
    }
}

fn rule_failure(rule: &Rule, span: Span, stage: &str) -> Finding {
    Finding {
        rule: rule.id.clone(),
        kind: FindingKind::RuleFailure,
        severity: Severity::Error,
        message: format!("rule {} panicked in its {} at {}", rule.id, stage, span),
        span,
        edits: Vec::new(),
    }
}

/// Collect the edits of all violation findings, optionally restricted to
/// one rule. Suppressed findings must be filtered out before this.
pub fn edits_of(findings: &[Finding], rule: Option<&str>) -> Vec<Edit> {
    findings
        .iter()
        .filter(|f| f.kind == FindingKind::Violation)
        .filter(|f| rule.map_or(true, |r| f.rule == r))
        .flat_map(|f| f.edits.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend;
    use crate::matcher::Matcher;
    use crate::resolve::ImportResolver;
    use crate::tree::NodeKind;

    fn registry_with(rules: Vec<Rule>) -> RuleRegistry {
        let mut registry = RuleRegistry::new();
        for rule in rules {
            registry.register(rule).unwrap();
        }
        registry
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let tree = frontend::java::parse(
            "class A { void f() { System.exit(1); System.exit(2); } }",
        )
        .unwrap();
        let resolver = ImportResolver::from_tree(&tree);
        let registry = RuleRegistry::with_builtin_rules();
        let driver = Driver::new(&registry, &resolver);

        let first = driver.analyze(&tree);
        let second = driver.analyze(&tree);

        assert_eq!(first.len(), 2);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.rule, b.rule);
            assert_eq!(a.span, b.span);
            assert_eq!(a.message, b.message);
        }
        // node-major order follows the source
        assert!(first[0].span.start_byte < first[1].span.start_byte);
    }

    #[test]
    fn test_panicking_trigger_is_isolated() {
        let panicking = Rule::new(
            "broken-rule",
            Severity::Error,
            "never rendered",
            Matcher::kind(NodeKind::MethodInvocation)
                .and(Matcher::Custom(|_, _| panic!("boom"))),
        );
        let sound = Rule::new(
            "sound-rule",
            Severity::Warning,
            "found a call",
            Matcher::kind(NodeKind::MethodInvocation),
        );
        let registry = registry_with(vec![panicking, sound]);

        let tree = frontend::java::parse("class A { void f() { g(); } }").unwrap();
        let resolver = ImportResolver::from_tree(&tree);
        let findings = Driver::new(&registry, &resolver).analyze(&tree);

        let failures: Vec<_> = findings
            .iter()
            .filter(|f| f.kind == FindingKind::RuleFailure)
            .collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].rule, "broken-rule");

        // the other rule still reported its finding
        assert!(findings
            .iter()
            .any(|f| f.rule == "sound-rule" && f.kind == FindingKind::Violation));
    }

    #[test]
    fn test_panicking_fix_is_isolated() {
        let broken_fix = Rule::new(
            "broken-fix",
            Severity::Error,
            "never rendered",
            Matcher::kind(NodeKind::MethodInvocation),
        )
        .with_fix(|_, _| panic!("fix boom"));
        let registry = registry_with(vec![broken_fix]);

        let tree = frontend::java::parse("class A { void f() { g(); h(); } }").unwrap();
        let resolver = ImportResolver::from_tree(&tree);
        let findings = Driver::new(&registry, &resolver).analyze(&tree);

        // both call sites produce a failure finding, nothing else
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| f.kind == FindingKind::RuleFailure));
    }

    #[test]
    fn test_edits_are_stamped_with_rule_id() {
        let tree = frontend::java::parse(
            "import java.util.HashSet;\nclass A { Object s = new HashSet<>(10); }",
        )
        .unwrap();
        let resolver = ImportResolver::from_tree(&tree);
        let registry = RuleRegistry::with_builtin_rules();
        let findings = Driver::new(&registry, &resolver).analyze(&tree);

        let edits = edits_of(&findings, Some("sized-hashset-constructor"));
        assert!(!edits.is_empty());
        assert!(edits
            .iter()
            .all(|e| e.rule == "sized-hashset-constructor"));
    }

    #[test]
    fn test_independent_rules_both_fire_at_one_node() {
        let a = Rule::new(
            "first",
            Severity::Info,
            "a",
            Matcher::kind(NodeKind::MethodInvocation),
        );
        let b = Rule::new(
            "second",
            Severity::Info,
            "b",
            Matcher::kind(NodeKind::MethodInvocation),
        );
        let registry = registry_with(vec![a, b]);

        let tree = frontend::java::parse("class A { void f() { g(); } }").unwrap();
        let resolver = ImportResolver::from_tree(&tree);
        let findings = Driver::new(&registry, &resolver).analyze(&tree);

        assert_eq!(findings.len(), 2);
        // registration order within one node
        assert_eq!(findings[0].rule, "first");
        assert_eq!(findings[1].rule, "second");
        assert_eq!(findings[0].span, findings[1].span);
    }
}
