//! Analysis report model
//!
//! An [`Analysis`] is built once by the analyser and is read-only afterwards:
//! it exposes accessors but no mutators.

use crate::alerter::Alerts;
use crate::resource::{Resource, ResourceKey};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Kind of a leaf-level mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Only the live side has a value
    Add,
    /// Only the declared side has a value
    Remove,
    /// Both sides have different values
    Update,
}

/// One leaf-level difference between declared and live state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Change {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub path: Vec<String>,
    /// Declared (state) value
    pub from: Option<Value>,
    /// Live (remote) value
    pub to: Option<Value>,
    /// The path is provider-computed but the declared side set it explicitly
    pub computed: bool,
}

/// Drifted resource with its changelog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Difference {
    pub res: ResourceKey,
    pub changelog: Vec<Change>,
}

/// Resource counts of an analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_resources: usize,
    pub total_changed: usize,
    pub total_unmanaged: usize,
    pub total_deleted: usize,
    pub total_managed: usize,
}

/// Result of comparing declared and live resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Analysis {
    summary: Summary,
    #[serde(serialize_with = "serialize_keys")]
    managed: Vec<Resource>,
    #[serde(serialize_with = "serialize_keys")]
    unmanaged: Vec<Resource>,
    #[serde(serialize_with = "serialize_keys")]
    deleted: Vec<Resource>,
    differences: Vec<Difference>,
    coverage: usize,
    alerts: Alerts,
}

impl Analysis {
    /// Assemble a report. Every collection must already be sorted.
    pub(crate) fn new(
        managed: Vec<Resource>,
        unmanaged: Vec<Resource>,
        deleted: Vec<Resource>,
        differences: Vec<Difference>,
        alerts: Alerts,
    ) -> Self {
        let total_resources = managed.len() + unmanaged.len() + deleted.len();
        let summary = Summary {
            total_resources,
            total_changed: differences.len(),
            total_unmanaged: unmanaged.len(),
            total_deleted: deleted.len(),
            total_managed: managed.len(),
        };
        let coverage = if total_resources == 0 {
            0
        } else {
            managed.len() * 100 / total_resources
        };

        Self {
            summary,
            managed,
            unmanaged,
            deleted,
            differences,
            coverage,
            alerts,
        }
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn managed(&self) -> &[Resource] {
        &self.managed
    }

    pub fn unmanaged(&self) -> &[Resource] {
        &self.unmanaged
    }

    pub fn deleted(&self) -> &[Resource] {
        &self.deleted
    }

    pub fn differences(&self) -> &[Difference] {
        &self.differences
    }

    /// Percentage of resources that are managed
    pub fn coverage(&self) -> usize {
        self.coverage
    }

    pub fn alerts(&self) -> &Alerts {
        &self.alerts
    }

    /// No drift, no unmanaged and no deleted resource.
    pub fn is_sync(&self) -> bool {
        self.differences.is_empty() && self.unmanaged.is_empty() && self.deleted.is_empty()
    }

    /// Changelog of one resource, if it drifted.
    pub fn changes_of(&self, key: &ResourceKey) -> Option<&[Change]> {
        self.differences
            .iter()
            .find(|d| d.res == *key)
            .map(|d| d.changelog.as_slice())
    }
}

fn serialize_keys<S: Serializer>(resources: &[Resource], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(resources.iter().map(Resource::key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_and_coverage() {
        let analysis = Analysis::new(
            vec![Resource::new("aws_vpc", "a"), Resource::new("aws_vpc", "b")],
            vec![Resource::new("aws_vpc", "c")],
            vec![Resource::new("aws_vpc", "d")],
            vec![],
            Alerts::new(),
        );
        assert_eq!(analysis.summary().total_resources, 4);
        assert_eq!(analysis.summary().total_managed, 2);
        assert_eq!(analysis.coverage(), 50);
        assert!(!analysis.is_sync());
    }

    #[test]
    fn test_empty_analysis_is_sync() {
        let analysis = Analysis::new(vec![], vec![], vec![], vec![], Alerts::new());
        assert_eq!(analysis.coverage(), 0);
        assert!(analysis.is_sync());
    }

    #[test]
    fn test_serialized_shape() {
        let analysis = Analysis::new(
            vec![Resource::new("aws_vpc", "a")],
            vec![],
            vec![],
            vec![Difference {
                res: ResourceKey::new("aws_vpc", "a"),
                changelog: vec![Change {
                    kind: ChangeKind::Update,
                    path: vec!["cidr_block".to_string()],
                    from: Some(json!("10.0.0.0/16")),
                    to: Some(json!("10.1.0.0/16")),
                    computed: false,
                }],
            }],
            Alerts::new(),
        );
        let value = serde_json::to_value(&analysis).unwrap();
        assert_eq!(value["managed"], json!([{"type": "aws_vpc", "id": "a"}]));
        assert_eq!(value["differences"][0]["changelog"][0]["type"], json!("update"));
        assert_eq!(value["summary"]["total_changed"], json!(1));
        assert_eq!(value["coverage"], json!(100));
        assert!(analysis.changes_of(&ResourceKey::new("aws_vpc", "a")).is_some());
        assert!(analysis.changes_of(&ResourceKey::new("aws_vpc", "b")).is_none());
    }
}
