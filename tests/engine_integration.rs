//! Integration tests for the full analysis pipeline.
//!
//! These tests validate that the engine correctly reports, suppresses,
//! and fixes violations when run against the testdata fixtures.

use std::path::PathBuf;

use fixcheck::driver::{edits_of, Driver, Finding, FindingKind};
use fixcheck::edit::apply_edits;
use fixcheck::frontend;
use fixcheck::resolve::ImportResolver;
use fixcheck::rules::RuleRegistry;
use fixcheck::suppress;

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(testdata_path().join(name)).expect("should read fixture")
}

fn analyze(source: &str) -> Vec<Finding> {
    let tree = frontend::java::parse(source).expect("fixture should parse");
    let resolver = ImportResolver::from_tree(&tree);
    let registry = RuleRegistry::with_builtin_rules();
    Driver::new(&registry, &resolver).analyze(&tree)
}

#[test]
fn test_violations_fixture_trips_every_rule() {
    let findings = analyze(&read_fixture("Violations.java"));

    let rules: Vec<&str> = findings.iter().map(|f| f.rule.as_str()).collect();
    assert_eq!(
        rules,
        vec![
            "sized-hashset-constructor",
            "boxed-primitive-constructor",
            "string-reference-equality",
            "system-exit",
        ]
    );
    assert!(findings
        .iter()
        .all(|f| f.kind == FindingKind::Violation));
}

#[test]
fn test_findings_are_ordered_by_source_position() {
    let findings = analyze(&read_fixture("Violations.java"));
    for pair in findings.windows(2) {
        assert!(pair[0].span.start_byte <= pair[1].span.start_byte);
    }
}

#[test]
fn test_clean_fixture_has_no_findings() {
    let findings = analyze(&read_fixture("Clean.java"));
    assert!(findings.is_empty(), "unexpected findings: {findings:?}");
}

#[test]
fn test_analysis_is_deterministic_across_runs() {
    let source = read_fixture("Violations.java");
    let first = analyze(&source);
    let second = analyze(&source);

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.rule, b.rule);
        assert_eq!(a.span, b.span);
        assert_eq!(a.message, b.message);
        assert_eq!(a.edits, b.edits);
    }
}

#[test]
fn test_suppression_splits_findings() {
    let source = read_fixture("Suppressed.java");
    let findings = analyze(&source);
    assert_eq!(findings.len(), 1);

    let suppressions = suppress::parse_suppressions(&source);
    let (active, suppressed) = suppress::filter_suppressed(findings, &suppressions);

    assert!(active.is_empty());
    assert_eq!(suppressed.len(), 1);
    assert_eq!(suppressed[0].finding.rule, "system-exit");
    assert_eq!(suppressed[0].suppression.reason, "entry point");
}

#[test]
fn test_fixing_everything_leaves_only_unfixable_findings() {
    let source = read_fixture("Violations.java");
    let findings = analyze(&source);

    let edits = edits_of(&findings, None);
    let fixed = apply_edits(&source, &edits).expect("fixture edits are disjoint");

    let remaining = analyze(&fixed);
    // system-exit has no fix and must still be reported; everything
    // fixable is gone.
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].rule, "system-exit");
    assert!(remaining[0].edits.is_empty());
}

#[test]
fn test_fixed_output_still_parses_and_keeps_imports() {
    let source = read_fixture("Violations.java");
    let findings = analyze(&source);
    let fixed = apply_edits(&source, &edits_of(&findings, None)).unwrap();

    assert!(fixed.contains("import java.util.HashSet;"));
    assert!(fixed.contains("import com.google.common.collect.Sets;"));
    assert!(fixed.contains("Sets.newHashSetWithExpectedSize(16)"));
    assert!(fixed.contains("Integer.valueOf(42)"));
    assert!(fixed.contains("name.equals(\"default\")"));
    // still well-formed Java
    frontend::java::parse(&fixed).unwrap();
}
