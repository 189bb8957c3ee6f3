//! Configuration file loading (`fixcheck.yaml`).
//!
//! ```yaml
//! rules:
//!   string-reference-equality: error
//!   system-exit: off
//! include:
//!   - "src/**/*.java"
//! exclude:
//!   - "**/generated/**"
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

use crate::rules::{RuleRegistry, Severity};

/// Config file names searched for, in order.
pub const CONFIG_NAMES: &[&str] = &["fixcheck.yaml", ".fixcheck.yaml"];

/// Per-rule setting: a severity override, or disabled entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSetting {
    Off,
    Severity(Severity),
}

impl<'de> Deserialize<'de> for RuleSetting {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SettingVisitor;

        impl Visitor<'_> for SettingVisitor {
            type Value = RuleSetting;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("\"off\", \"error\", \"warning\", or \"info\"")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<RuleSetting, E> {
                if value.eq_ignore_ascii_case("off") {
                    return Ok(RuleSetting::Off);
                }
                Severity::from_str(value)
                    .map(RuleSetting::Severity)
                    .map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(SettingVisitor)
    }
}

/// Loaded configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Rule id -> setting.
    pub rules: HashMap<String, RuleSetting>,
    /// Globs selecting files to analyze (default: `**/*.java`).
    pub include: Vec<String>,
    /// Globs excluding files from analysis.
    pub exclude: Vec<String>,
}

impl Config {
    /// Parse a config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Look for a config file in `dir`.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
    }

    /// Build the rule registry this config selects: built-in rules minus
    /// the ones switched off, with severity overrides applied.
    ///
    /// An unknown rule id is a configuration error.
    pub fn registry(&self) -> anyhow::Result<RuleRegistry> {
        let defaults = RuleRegistry::with_builtin_rules();
        for id in self.rules.keys() {
            if defaults.lookup(id).is_none() {
                anyhow::bail!("config names unknown rule id: {}", id);
            }
        }

        let mut registry = RuleRegistry::new();
        for mut rule in crate::rules::builtin::rules() {
            match self.rules.get(&rule.id) {
                Some(RuleSetting::Off) => continue,
                Some(RuleSetting::Severity(severity)) => rule.severity = *severity,
                None => {}
            }
            registry
                .register(rule)
                .expect("builtin rule ids are unique");
        }
        Ok(registry)
    }

    /// Compile the include/exclude globs into a file matcher.
    pub fn file_matcher(&self) -> anyhow::Result<FileMatcher> {
        let include = if self.include.is_empty() {
            build_glob_set(&["**/*.java".to_string()])?
        } else {
            build_glob_set(&self.include)?
        };
        let exclude = build_glob_set(&self.exclude)?;
        Ok(FileMatcher { include, exclude })
    }
}

fn build_glob_set(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob =
            Glob::new(pattern).with_context(|| format!("invalid glob {:?}", pattern))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Compiled include/exclude filter over relative paths.
pub struct FileMatcher {
    include: GlobSet,
    exclude: GlobSet,
}

impl FileMatcher {
    /// Whether a path (relative to the scan root) should be analyzed.
    pub fn is_match(&self, path: &Path) -> bool {
        self.include.is_match(path) && !self.exclude.is_match(path)
    }
}
