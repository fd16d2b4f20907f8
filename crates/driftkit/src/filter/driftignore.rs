//! `.driftignore` rules
//!
//! One rule per line:
//! ```text
//! # ignore every IAM user policy
//! aws_iam_user_policy.*
//! # ignore tag drift on a single instance
//! aws_instance.i-0123.tags.*
//! # ids containing dots are escaped
//! aws_s3_bucket.assets\.example\.com
//! ```

use super::escape::{escapable_split, join_escaped};
use crate::resource::Resource;
use std::collections::{HashMap, HashSet};
use std::io::ErrorKind;
use std::path::Path;

/// Default rule file name, looked up in the working directory.
pub const DRIFTIGNORE_FILE: &str = ".driftignore";

const WILDCARD: &str = "*";

/// Parsed suppression rules.
#[derive(Debug, Clone, Default)]
pub struct DriftIgnore {
    /// `type.id` entries whose resources are ignored entirely
    resource_exclusions: HashSet<String>,
    /// `type.id` -> field path patterns whose drift is ignored
    field_exclusions: HashMap<String, Vec<Vec<String>>>,
}

impl DriftIgnore {
    /// Rule set that ignores nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read rules from `path`.
    ///
    /// Never fails: a missing or unreadable file yields an empty rule set.
    pub fn from_file(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                log::debug!("Reading ignore rules from {}", path.display());
                Self::parse(&content)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No ignore file at {}", path.display());
                Self::empty()
            }
            Err(e) => {
                log::warn!("Unable to read {}: {e}", path.display());
                Self::empty()
            }
        }
    }

    /// Parse rules from text. Malformed lines are logged and skipped.
    pub fn parse(content: &str) -> Self {
        let mut ignore = Self::empty();
        for line in content.lines() {
            ignore.add_rule(line);
        }
        ignore
    }

    fn add_rule(&mut self, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return;
        }

        let segments = escapable_split(line);
        match segments.len() {
            0 | 1 => {
                log::warn!(
                    "Unable to parse line {line:?}, invalid length, got {} expected >= 2",
                    segments.len()
                );
            }
            2 => {
                log::debug!(
                    "Found ignore resource rule (type={}, id={})",
                    segments[0],
                    segments[1]
                );
                self.resource_exclusions
                    .insert(rule_key(&segments[0], &segments[1]));
            }
            _ => {
                let key = rule_key(&segments[0], &segments[1]);
                let pattern = segments[2..].to_vec();
                log::debug!(
                    "Found ignore resource field rule (type={}, id={}, path={})",
                    segments[0],
                    segments[1],
                    pattern.join(".")
                );
                self.field_exclusions.entry(key).or_default().push(pattern);
            }
        }
    }

    /// Whether the whole resource is excluded from analysis.
    pub fn is_resource_ignored(&self, res: &Resource) -> bool {
        self.resource_exclusions.contains(&rule_key(res.ty(), res.id()))
            || self
                .resource_exclusions
                .contains(&rule_key(res.ty(), WILDCARD))
    }

    /// Whether drift at `path` of `res` is excluded.
    ///
    /// Rules registered for the exact id replace the wildcard-id rules.
    pub fn is_field_ignored<S: AsRef<str>>(&self, res: &Resource, path: &[S]) -> bool {
        let rules = self
            .field_exclusions
            .get(&rule_key(res.ty(), res.id()))
            .or_else(|| self.field_exclusions.get(&rule_key(res.ty(), WILDCARD)));

        match rules {
            Some(rules) => rules.iter().any(|rule| rule_matches(rule, path)),
            None => false,
        }
    }

    /// Number of resource and field rules.
    pub fn len(&self) -> usize {
        self.resource_exclusions.len() + self.field_exclusions.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn rule_key(ty: &str, id: &str) -> String {
    join_escaped(&[ty, id])
}

fn rule_matches<S: AsRef<str>>(rule: &[String], path: &[S]) -> bool {
    if rule.len() > path.len() {
        return false;
    }
    rule.iter()
        .zip(path)
        .all(|(expected, actual)| expected == WILDCARD || *expected == actual.as_ref().to_lowercase())
}
