//! Drift analyser
//!
//! Classifies resources into managed, unmanaged and deleted, diffs the
//! managed ones and filters everything through the ignore rules.

pub mod diff;

pub use diff::Differ;

use crate::alerter::{should_ignore_type, Alerts};
use crate::analysis::{Analysis, Change, Difference};
use crate::filter::DriftIgnore;
use crate::resource::{Resource, ResourceKey};
use crate::schema::SchemaRepository;
use std::collections::BTreeMap;

/// Compares declared and live resources.
pub struct Analyzer<'a> {
    schemas: &'a SchemaRepository,
    filter: &'a DriftIgnore,
}

impl<'a> Analyzer<'a> {
    pub fn new(schemas: &'a SchemaRepository, filter: &'a DriftIgnore) -> Self {
        Self { schemas, filter }
    }

    /// Build the analysis of `remote` against `state`.
    ///
    /// Output collections come out sorted by `(type, id)`.
    pub fn analyze(&self, remote: &[Resource], state: &[Resource], alerts: &Alerts) -> Analysis {
        let remote = self.index(remote, "remote");
        let state = self.index(state, "state");

        let mut managed = Vec::new();
        let mut deleted = Vec::new();
        let mut differences = Vec::new();

        for (key, declared) in &state {
            match remote.get(key) {
                Some(live) => {
                    managed.push((*declared).clone());
                    let changelog = self.compare(declared, live);
                    if !changelog.is_empty() {
                        differences.push(Difference {
                            res: key.clone(),
                            changelog,
                        });
                    }
                }
                None if should_ignore_type(alerts, &key.ty) => {
                    log::debug!("Not reporting {key} as deleted, its type could not be enumerated");
                }
                None => deleted.push((*declared).clone()),
            }
        }

        let unmanaged: Vec<Resource> = remote
            .iter()
            .filter(|(key, _)| !state.contains_key(*key))
            .map(|(_, live)| (*live).clone())
            .collect();

        log::debug!(
            "Analysis done: {} managed, {} unmanaged, {} deleted, {} drifted",
            managed.len(),
            unmanaged.len(),
            deleted.len(),
            differences.len()
        );

        Analysis::new(managed, unmanaged, deleted, differences, alerts.clone())
    }

    /// Index a set by identity, dropping ignored resources.
    fn index<'r>(&self, resources: &'r [Resource], side: &str) -> BTreeMap<ResourceKey, &'r Resource> {
        let mut index = BTreeMap::new();
        for res in resources {
            if self.filter.is_resource_ignored(res) {
                log::debug!("Ignoring {res} from {side} resources");
                continue;
            }
            if index.insert(res.key(), res).is_some() {
                log::debug!("Duplicate {side} resource {res}, keeping the last one");
            }
        }
        index
    }

    /// Leaf changes between the declared and live resource, minus ignored fields.
    fn compare(&self, declared: &Resource, live: &Resource) -> Vec<Change> {
        let differ = Differ::new(self.schemas.get_schema(declared.ty()));
        let mut changes = differ.diff(declared.attributes(), live.attributes());
        changes.retain(|change| {
            let ignored = self.filter.is_field_ignored(declared, change.path.as_slice());
            if ignored {
                log::debug!("Ignoring drift on {declared} at {}", change.path.join("."));
            }
            !ignored
        });
        changes
    }
}
