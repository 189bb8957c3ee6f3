//! Output formatting for analysis results.
//!
//! Two formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::Serialize;

use crate::driver::{Finding, FindingKind};
use crate::rules::Severity;
use crate::suppress::SuppressedFinding;

/// Everything one file's analysis produced.
#[derive(Debug, Serialize)]
pub struct FileReport {
    /// Path relative to the scan root.
    pub path: String,
    pub findings: Vec<Finding>,
    pub suppressed: Vec<SuppressedFinding>,
    /// Set when the file could not be parsed; counts as an error.
    pub parse_error: Option<String>,
}

impl FileReport {
    pub fn has_errors(&self) -> bool {
        self.parse_error.is_some()
            || self
                .findings
                .iter()
                .any(|f| f.severity == Severity::Error)
    }
}

// =============================================================================
// JSON format
// =============================================================================

#[derive(Serialize)]
pub struct JsonReport<'a> {
    pub version: String,
    pub path: String,
    pub files_scanned: usize,
    pub findings: usize,
    pub suppressed: usize,
    pub files: &'a [FileReport],
}

/// Write results in JSON format.
pub fn write_json(scan_path: &str, files: &[FileReport]) -> anyhow::Result<()> {
    let report = JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: scan_path.to_string(),
        files_scanned: files.len(),
        findings: files.iter().map(|f| f.findings.len()).sum(),
        suppressed: files.iter().map(|f| f.suppressed.len()).sum(),
        files,
    };
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(scan_path: &str, files: &[FileReport], show_suppressed: bool) {
    println!();
    print!("  ");
    print!("{}", "fixcheck".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();
    print!("  {}", "Checking: ".dimmed());
    println!("{}", scan_path);
    println!();

    let mut total = 0;
    let mut fixable = 0;
    let mut suppressed_total = 0;

    for file in files {
        if let Some(err) = &file.parse_error {
            print!("    {} ", "ERROR".red());
            print!("{:<28}", "parse".dimmed());
            println!("{}", file.path.blue());
            println!("            {}", err);
            println!();
            continue;
        }

        suppressed_total += file.suppressed.len();
        for finding in &file.findings {
            total += 1;
            if finding.is_fixable() {
                fixable += 1;
            }
            write_finding(&file.path, finding);
        }
    }

    if show_suppressed && suppressed_total > 0 {
        println!("  {} ({}):", "Suppressed".dimmed(), suppressed_total);
        println!();
        for file in files {
            for sv in &file.suppressed {
                write_finding(&file.path, &sv.finding);
                if !sv.suppression.reason.is_empty() {
                    println!(
                        "            {}",
                        format!("reason: {}", sv.suppression.reason).dimmed()
                    );
                }
            }
        }
    }

    print!("  {} finding{}", total, plural(total));
    if fixable > 0 {
        print!(
            "  {}",
            format!("({} fixable with `fixcheck fix`)", fixable).green()
        );
    }
    if suppressed_total > 0 && !show_suppressed {
        print!(
            "  {}",
            format!("({} suppressed)", suppressed_total).dimmed()
        );
    }
    println!();
    println!();
}

fn write_finding(path: &str, finding: &Finding) {
    write_severity_tag(&finding.severity);
    print!("   ");
    print!("{:<28}", finding.rule.dimmed());
    print!("{}", path.blue());
    println!(
        "{}",
        format!(":{}:{}", finding.span.start_line, finding.span.start_col).dimmed()
    );

    if finding.kind == FindingKind::RuleFailure {
        println!("            {}", finding.message.red());
    } else {
        println!("            {}", finding.message);
    }
    println!();
}

fn write_severity_tag(severity: &Severity) {
    match severity {
        Severity::Error => print!("    {} ", "ERROR".red()),
        Severity::Warning => print!("    {} ", "WARN ".yellow()),
        Severity::Info => print!("    {} ", "INFO ".blue()),
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
