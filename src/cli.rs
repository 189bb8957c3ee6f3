//! Command-line interface for fixcheck.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::config::{Config, FileMatcher};
use crate::driver::{edits_of, Driver};
use crate::edit::apply_edits;
use crate::frontend;
use crate::report::{self, FileReport};
use crate::resolve::ImportResolver;
use crate::rules::RuleRegistry;
use crate::suppress;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Rule-based bug pattern checker with deterministic auto-fixes.
///
/// fixcheck parses Java sources, evaluates every registered rule at every
/// syntax tree node, and reports findings. Rules that carry a fix can
/// rewrite the offending code in place; everything outside the rewritten
/// ranges is preserved byte for byte.
#[derive(Parser)]
#[command(name = "fixcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report findings without touching any file
    #[command(visible_alias = "lint")]
    Check(CheckArgs),
    /// Apply the fixes of fixable findings in place
    Fix(FixArgs),
    /// List the registered rules
    Rules,
}

/// Arguments for the check command.
#[derive(Parser)]
pub struct CheckArgs {
    /// Path to check (file or directory)
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover fixcheck.yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Show suppressed findings in output
    #[arg(long)]
    pub show_suppressed: bool,
}

/// Arguments for the fix command.
#[derive(Parser)]
pub struct FixArgs {
    /// Path to fix (file or directory)
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover fixcheck.yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Apply only this rule's fixes (the way out of conflicting edits)
    #[arg(short, long)]
    pub rule: Option<String>,

    /// Report what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Run the check command.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<i32> {
    let config = load_config(args.config.as_deref(), &args.path)?;
    let registry = config.registry()?;
    let matcher = config.file_matcher()?;
    let files = collect_files(&args.path, &matcher)?;

    // Files are independent units; per-file analysis stays sequential.
    let reports: Vec<FileReport> = files
        .par_iter()
        .map(|path| analyze_file(path, &args.path, &registry))
        .collect();

    match args.format.as_str() {
        "pretty" => report::write_pretty(&args.path.display().to_string(), &reports, args.show_suppressed),
        "json" => report::write_json(&args.path.display().to_string(), &reports)?,
        other => anyhow::bail!("unknown output format: {}", other),
    }

    if reports.iter().any(|r| r.has_errors()) {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the fix command.
pub fn run_fix(args: &FixArgs) -> anyhow::Result<i32> {
    let config = load_config(args.config.as_deref(), &args.path)?;
    let registry = config.registry()?;
    if let Some(rule) = &args.rule {
        if registry.lookup(rule).is_none() {
            anyhow::bail!("unknown rule id: {}", rule);
        }
    }
    let matcher = config.file_matcher()?;
    let files = collect_files(&args.path, &matcher)?;

    let mut failed = false;
    for path in &files {
        let display = relative_path(path, &args.path);
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("{}: {}", display, e);
                failed = true;
                continue;
            }
        };
        let tree = match frontend::java::parse(&source) {
            Ok(tree) => tree,
            Err(e) => {
                eprintln!("{}: {}", display, e);
                failed = true;
                continue;
            }
        };

        let resolver = ImportResolver::from_tree(&tree);
        let findings = Driver::new(&registry, &resolver).analyze(&tree);
        let suppressions = suppress::parse_suppressions(&source);
        let (active, _) = suppress::filter_suppressed(findings, &suppressions);

        let edits = edits_of(&active, args.rule.as_deref());
        if edits.is_empty() {
            continue;
        }

        match apply_edits(&source, &edits) {
            Ok(fixed) => {
                if args.dry_run {
                    println!("{}: {} edit(s) would be applied", display, edits.len());
                } else {
                    fs::write(path, fixed)?;
                    println!("{}: {} edit(s) applied", display, edits.len());
                }
            }
            Err(e) => {
                eprintln!("{}: {}", display, e);
                eprintln!("    re-run with --rule <id> to apply one rule's fixes at a time");
                failed = true;
            }
        }
    }

    if failed {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the rules command.
pub fn run_rules() -> anyhow::Result<i32> {
    let registry = RuleRegistry::with_builtin_rules();
    for rule in registry.all() {
        let fixable = if rule.fix.is_some() { "fix" } else { "" };
        println!("{:<30} {:<8} {:<4} {}", rule.id, rule.severity, fixable, rule.message);
    }
    Ok(EXIT_SUCCESS)
}

/// Analyze one file into a report. Read and parse failures stay local to
/// the file.
fn analyze_file(path: &Path, root: &Path, registry: &RuleRegistry) -> FileReport {
    let display = relative_path(path, root);
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            return FileReport {
                path: display,
                findings: Vec::new(),
                suppressed: Vec::new(),
                parse_error: Some(e.to_string()),
            }
        }
    };
    let tree = match frontend::java::parse(&source) {
        Ok(tree) => tree,
        Err(e) => {
            return FileReport {
                path: display,
                findings: Vec::new(),
                suppressed: Vec::new(),
                parse_error: Some(e.to_string()),
            }
        }
    };

    let resolver = ImportResolver::from_tree(&tree);
    let findings = Driver::new(registry, &resolver).analyze(&tree);
    let suppressions = suppress::parse_suppressions(&source);
    let (active, suppressed) = suppress::filter_suppressed(findings, &suppressions);

    FileReport {
        path: display,
        findings: active,
        suppressed,
        parse_error: None,
    }
}

fn load_config(explicit: Option<&Path>, scan_path: &Path) -> anyhow::Result<Config> {
    if let Some(path) = explicit {
        return Config::load(path);
    }
    let dir = if scan_path.is_dir() {
        scan_path
    } else {
        scan_path.parent().unwrap_or_else(|| Path::new("."))
    };
    match Config::discover(dir) {
        Some(path) => Config::load(&path),
        None => Ok(Config::default()),
    }
}

/// Collect files to analyze, sorted for deterministic output order.
fn collect_files(root: &Path, matcher: &FileMatcher) -> anyhow::Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if matcher.is_match(rel) {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

fn relative_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_check_clean_directory() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("A.java"),
            "class A { void f() { g(); } }",
        )
        .unwrap();

        let args = CheckArgs {
            path: temp.path().to_path_buf(),
            config: None,
            format: "pretty".to_string(),
            show_suppressed: false,
        };
        assert_eq!(run_check(&args).unwrap(), EXIT_SUCCESS);
    }

    #[test]
    fn test_check_fails_on_error_finding() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("A.java"),
            "class A { Object x = new Integer(5); }",
        )
        .unwrap();

        let args = CheckArgs {
            path: temp.path().to_path_buf(),
            config: None,
            format: "pretty".to_string(),
            show_suppressed: false,
        };
        assert_eq!(run_check(&args).unwrap(), EXIT_FAILED);
    }

    #[test]
    fn test_syntax_error_does_not_abort_other_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("Bad.java"), "class { {").unwrap();
        fs::write(
            temp.path().join("Good.java"),
            "class A { void f() { System.exit(1); } }",
        )
        .unwrap();

        let config = Config::default();
        let registry = config.registry().unwrap();
        let matcher = config.file_matcher().unwrap();
        let files = collect_files(temp.path(), &matcher).unwrap();
        assert_eq!(files.len(), 2);

        let reports: Vec<FileReport> = files
            .iter()
            .map(|p| analyze_file(p, temp.path(), &registry))
            .collect();

        assert!(reports[0].parse_error.is_some());
        assert!(reports[1].parse_error.is_none());
        assert_eq!(reports[1].findings.len(), 1);
    }

    #[test]
    fn test_fix_rewrites_file_in_place() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("A.java");
        fs::write(&file, "class A { Object x = new Integer(5); }").unwrap();

        let args = FixArgs {
            path: temp.path().to_path_buf(),
            config: None,
            rule: None,
            dry_run: false,
        };
        assert_eq!(run_fix(&args).unwrap(), EXIT_SUCCESS);
        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "class A { Object x = Integer.valueOf(5); }"
        );
    }

    #[test]
    fn test_fix_dry_run_leaves_file_alone() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("A.java");
        let source = "class A { Object x = new Integer(5); }";
        fs::write(&file, source).unwrap();

        let args = FixArgs {
            path: temp.path().to_path_buf(),
            config: None,
            rule: None,
            dry_run: true,
        };
        assert_eq!(run_fix(&args).unwrap(), EXIT_SUCCESS);
        assert_eq!(fs::read_to_string(&file).unwrap(), source);
    }

    #[test]
    fn test_fix_respects_suppressions() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("A.java");
        let source = "class A {\n    // fixcheck:ignore-next-line boxed-primitive-constructor\n    Object x = new Integer(5);\n}";
        fs::write(&file, source).unwrap();

        let args = FixArgs {
            path: temp.path().to_path_buf(),
            config: None,
            rule: None,
            dry_run: false,
        };
        assert_eq!(run_fix(&args).unwrap(), EXIT_SUCCESS);
        assert_eq!(fs::read_to_string(&file).unwrap(), source);
    }

    #[test]
    fn test_fix_unknown_rule_is_an_error() {
        let temp = TempDir::new().unwrap();
        let args = FixArgs {
            path: temp.path().to_path_buf(),
            config: None,
            rule: Some("not-a-rule".to_string()),
            dry_run: false,
        };
        assert!(run_fix(&args).is_err());
    }
}
