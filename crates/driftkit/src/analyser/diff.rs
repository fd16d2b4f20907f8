//! Structural attribute diff
//!
//! Walks the declared and live attribute trees in lock-step and emits one
//! [`Change`] per leaf that disagrees. Schema metadata decides two things:
//! JSON-string leaves are parsed before comparison, and computed leaves that
//! the declared side leaves unset are not drift.

use crate::analysis::{Change, ChangeKind};
use crate::resource::Attributes;
use crate::schema::Schema;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Position in the walk.
///
/// `path` is what gets reported; `schema_path` omits sequence indices and is
/// what schema metadata is looked up with.
#[derive(Debug, Default)]
struct Cursor {
    path: Vec<String>,
    schema_path: Vec<String>,
}

impl Cursor {
    fn push_field(&mut self, field: &str) {
        self.path.push(field.to_string());
        self.schema_path.push(field.to_string());
    }

    fn pop_field(&mut self) {
        self.path.pop();
        self.schema_path.pop();
    }

    fn push_index(&mut self, index: usize) {
        self.path.push(index.to_string());
    }

    fn pop_index(&mut self) {
        self.path.pop();
    }

    fn schema_segments(&self) -> Vec<&str> {
        self.schema_path.iter().map(String::as_str).collect()
    }
}

/// Segment-wise path order where sequence indices compare numerically.
fn compare_paths(a: &[String], b: &[String]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        let ordering = match (x.parse::<usize>(), y.parse::<usize>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            _ => x.cmp(y),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a.len().cmp(&b.len())
}

/// Attribute differ for one resource type.
pub struct Differ<'a> {
    schema: Option<&'a Schema>,
}

impl<'a> Differ<'a> {
    /// `schema` is `None` for types without registered metadata.
    pub fn new(schema: Option<&'a Schema>) -> Self {
        Self { schema }
    }

    /// Changes turning `state` into `remote`, sorted by path.
    pub fn diff(&self, state: &Attributes, remote: &Attributes) -> Vec<Change> {
        let mut changes = Vec::new();
        let mut cursor = Cursor::default();
        self.diff_maps(state.as_map(), remote.as_map(), &mut cursor, &mut changes);
        changes.sort_by(|a, b| compare_paths(&a.path, &b.path));
        changes
    }

    fn diff_maps(
        &self,
        from: &Map<String, Value>,
        to: &Map<String, Value>,
        cursor: &mut Cursor,
        out: &mut Vec<Change>,
    ) {
        let keys: BTreeSet<&String> = from.keys().chain(to.keys()).collect();
        for key in keys {
            cursor.push_field(key);
            self.diff_value(from.get(key.as_str()), to.get(key.as_str()), cursor, out, true);
            cursor.pop_field();
        }
    }

    fn diff_sequences(&self, from: &[Value], to: &[Value], cursor: &mut Cursor, out: &mut Vec<Change>) {
        for index in 0..from.len().max(to.len()) {
            cursor.push_index(index);
            self.diff_value(from.get(index), to.get(index), cursor, out, true);
            cursor.pop_index();
        }
    }

    fn diff_value(
        &self,
        from: Option<&Value>,
        to: Option<&Value>,
        cursor: &mut Cursor,
        out: &mut Vec<Change>,
        parse_json: bool,
    ) {
        let from = from.filter(|v| !v.is_null());
        let to = to.filter(|v| !v.is_null());
        let empty_map = Map::new();

        match (from, to) {
            (None, None) => {}
            (Some(Value::Object(a)), Some(Value::Object(b))) => self.diff_maps(a, b, cursor, out),
            (Some(Value::Array(a)), Some(Value::Array(b))) => self.diff_sequences(a, b, cursor, out),
            (Some(Value::Object(a)), None) if !a.is_empty() => {
                self.diff_maps(a, &empty_map, cursor, out);
            }
            (None, Some(Value::Object(b))) if !b.is_empty() => {
                self.diff_maps(&empty_map, b, cursor, out);
            }
            (Some(Value::Array(a)), None) if !a.is_empty() => self.diff_sequences(a, &[], cursor, out),
            (None, Some(Value::Array(b))) if !b.is_empty() => self.diff_sequences(&[], b, cursor, out),
            (Some(Value::String(a)), Some(Value::String(b))) if parse_json && self.is_json_string(cursor) => {
                self.diff_json_strings(a, b, cursor, out);
            }
            (Some(a), Some(b)) => {
                if !values_equal(a, b) {
                    self.record(ChangeKind::Update, Some(a), Some(b), cursor, out);
                }
            }
            (Some(a), None) => self.record(ChangeKind::Remove, Some(a), None, cursor, out),
            (None, Some(b)) => self.record(ChangeKind::Add, None, Some(b), cursor, out),
        }
    }

    fn diff_json_strings(&self, from: &str, to: &str, cursor: &mut Cursor, out: &mut Vec<Change>) {
        match (
            serde_json::from_str::<Value>(from),
            serde_json::from_str::<Value>(to),
        ) {
            (Ok(a), Ok(b)) => self.diff_value(Some(&a), Some(&b), cursor, out, false),
            _ => {
                log::debug!(
                    "Unable to parse JSON at {}, comparing as text",
                    cursor.path.join(".")
                );
                if from != to {
                    let (a, b) = (Value::String(from.to_string()), Value::String(to.to_string()));
                    self.record(ChangeKind::Update, Some(&a), Some(&b), cursor, out);
                }
            }
        }
    }

    fn record(
        &self,
        kind: ChangeKind,
        from: Option<&Value>,
        to: Option<&Value>,
        cursor: &Cursor,
        out: &mut Vec<Change>,
    ) {
        let computed = self
            .schema
            .is_some_and(|s| s.is_computed(&cursor.schema_segments()));
        if computed && from.is_none() {
            return;
        }
        out.push(Change {
            kind,
            path: cursor.path.clone(),
            from: from.cloned(),
            to: to.cloned(),
            computed,
        });
    }

    fn is_json_string(&self, cursor: &Cursor) -> bool {
        self.schema
            .is_some_and(|s| s.is_json_string(&cursor.schema_segments()))
    }
}

/// Equality with numbers compared by value, so `1` and `1.0` match.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            x == y || matches!((x.as_f64(), y.as_f64()), (Some(fx), Some(fy)) if fx == fy)
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{computed, json_string, SchemaRepository};
    use serde_json::json;

    fn attrs(value: Value) -> Attributes {
        match value {
            Value::Object(map) => Attributes::from(map),
            _ => panic!("expected an object"),
        }
    }

    fn paths(changes: &[Change]) -> Vec<String> {
        changes.iter().map(|c| c.path.join(".")).collect()
    }

    #[test]
    fn test_identical_trees() {
        let a = attrs(json!({"name": "web", "tags": {"Env": "prod"}, "ports": [80, 443]}));
        assert!(Differ::new(None).diff(&a, &a.clone()).is_empty());
    }

    #[test]
    fn test_add_remove_update() {
        let state = attrs(json!({"name": "web", "ami": "ami-1", "old": true}));
        let remote = attrs(json!({"name": "web", "ami": "ami-2", "new": 1}));
        let changes = Differ::new(None).diff(&state, &remote);

        assert_eq!(paths(&changes), vec!["ami", "new", "old"]);
        assert_eq!(changes[0].kind, ChangeKind::Update);
        assert_eq!(changes[0].from, Some(json!("ami-1")));
        assert_eq!(changes[0].to, Some(json!("ami-2")));
        assert_eq!(changes[1].kind, ChangeKind::Add);
        assert_eq!(changes[1].from, None);
        assert_eq!(changes[2].kind, ChangeKind::Remove);
        assert_eq!(changes[2].to, None);
    }

    #[test]
    fn test_sequence_changes_sort_numerically() {
        let ports: Vec<u16> = (8000..8011).collect();
        let mut drifted = ports.clone();
        drifted[2] = 9002;
        drifted[10] = 9010;
        let state = attrs(json!({"ports": ports, "name": "a"}));
        let remote = attrs(json!({"ports": drifted, "name": "b"}));

        let changes = Differ::new(None).diff(&state, &remote);
        assert_eq!(paths(&changes), vec!["name", "ports.2", "ports.10"]);
        assert_eq!(changes[2].to, Some(json!(9010)));
    }

    #[test]
    fn test_nested_leaves() {
        let state = attrs(json!({"tags": {"Name": "a", "Env": "prod"}}));
        let remote = attrs(json!({"tags": {"Name": "b", "Env": "prod", "Owner": "ops"}}));
        let changes = Differ::new(None).diff(&state, &remote);
        assert_eq!(paths(&changes), vec!["tags.Name", "tags.Owner"]);
    }

    #[test]
    fn test_one_sided_mapping_reports_leaves() {
        let state = attrs(json!({}));
        let remote = attrs(json!({"tags": {"Name": "a", "Env": "prod"}}));
        let changes = Differ::new(None).diff(&state, &remote);
        assert_eq!(paths(&changes), vec!["tags.Env", "tags.Name"]);
        assert!(changes.iter().all(|c| c.kind == ChangeKind::Add));
    }

    #[test]
    fn test_empty_container_versus_absent() {
        let state = attrs(json!({"tags": {}, "ports": []}));
        let remote = attrs(json!({}));
        let changes = Differ::new(None).diff(&state, &remote);
        assert_eq!(paths(&changes), vec!["ports", "tags"]);
        assert!(changes.iter().all(|c| c.kind == ChangeKind::Remove));
    }

    #[test]
    fn test_null_is_absent() {
        let state = attrs(json!({"description": null}));
        let remote = attrs(json!({}));
        assert!(Differ::new(None).diff(&state, &remote).is_empty());
    }

    #[test]
    fn test_sequences_by_index() {
        let state = attrs(json!({"ports": [80, 443]}));
        let remote = attrs(json!({"ports": [80, 8443, 22]}));
        let changes = Differ::new(None).diff(&state, &remote);
        assert_eq!(paths(&changes), vec!["ports.1", "ports.2"]);
        assert_eq!(changes[0].kind, ChangeKind::Update);
        assert_eq!(changes[1].kind, ChangeKind::Add);
    }

    #[test]
    fn test_numbers_compare_by_value() {
        let state = attrs(json!({"size": 1}));
        let remote = attrs(json!({"size": 1.0}));
        assert!(Differ::new(None).diff(&state, &remote).is_empty());
    }

    #[test]
    fn test_type_mismatch_is_update() {
        let state = attrs(json!({"port": "80"}));
        let remote = attrs(json!({"port": 80}));
        let changes = Differ::new(None).diff(&state, &remote);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::Update);
    }

    #[test]
    fn test_json_string_formatting_is_not_drift() {
        let mut repo = SchemaRepository::new();
        repo.update_schema("aws_iam_user_policy", &[("policy", json_string)]);
        let schema = repo.get_schema("aws_iam_user_policy");

        let state = attrs(json!({"policy": "{\"Version\":\"2012-10-17\",\"Statement\":[]}"}));
        let remote = attrs(json!({"policy": "{\n  \"Statement\": [],\n  \"Version\": \"2012-10-17\"\n}"}));
        assert!(Differ::new(schema).diff(&state, &remote).is_empty());

        // Without metadata the raw text differs.
        assert_eq!(Differ::new(None).diff(&state, &remote).len(), 1);
    }

    #[test]
    fn test_json_string_structural_changes() {
        let mut repo = SchemaRepository::new();
        repo.update_schema("aws_iam_user_policy", &[("policy", json_string)]);
        let schema = repo.get_schema("aws_iam_user_policy");

        let state = attrs(json!({"policy": "{\"Statement\":[{\"Effect\":\"Allow\"}]}"}));
        let remote = attrs(json!({"policy": "{\"Statement\":[{\"Effect\":\"Deny\"}]}"}));
        let changes = Differ::new(schema).diff(&state, &remote);
        assert_eq!(paths(&changes), vec!["policy.Statement.0.Effect"]);
        assert_eq!(changes[0].from, Some(json!("Allow")));
    }

    #[test]
    fn test_json_string_invalid_falls_back_to_text() {
        let mut repo = SchemaRepository::new();
        repo.update_schema("t", &[("doc", json_string)]);
        let schema = repo.get_schema("t");

        let state = attrs(json!({"doc": "not json"}));
        let remote = attrs(json!({"doc": "{}"}));
        let changes = Differ::new(schema).diff(&state, &remote);
        assert_eq!(paths(&changes), vec!["doc"]);
        assert_eq!(changes[0].to, Some(json!("{}")));
    }

    #[test]
    fn test_computed_without_declared_value_is_suppressed() {
        let mut repo = SchemaRepository::new();
        repo.update_schema("aws_instance", &[("arn", computed)]);
        let schema = repo.get_schema("aws_instance");

        let state = attrs(json!({"ami": "ami-1"}));
        let remote = attrs(json!({"ami": "ami-1", "arn": "arn:aws:ec2:i-1"}));
        assert!(Differ::new(schema).diff(&state, &remote).is_empty());
    }

    #[test]
    fn test_computed_with_declared_value_is_reported() {
        let mut repo = SchemaRepository::new();
        repo.update_schema("aws_instance", &[("arn", computed)]);
        let schema = repo.get_schema("aws_instance");

        let state = attrs(json!({"arn": "arn:old"}));
        let remote = attrs(json!({"arn": "arn:new"}));
        let changes = Differ::new(schema).diff(&state, &remote);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::Update);
        assert!(changes[0].computed);
    }

    #[test]
    fn test_computed_removal_is_reported() {
        let mut repo = SchemaRepository::new();
        repo.update_schema("aws_instance", &[("tags_all", computed)]);
        let schema = repo.get_schema("aws_instance");

        let state = attrs(json!({"tags_all": {"Env": "prod"}}));
        let remote = attrs(json!({}));
        let changes = Differ::new(schema).diff(&state, &remote);
        assert_eq!(paths(&changes), vec!["tags_all.Env"]);
        assert_eq!(changes[0].kind, ChangeKind::Remove);
    }

    #[test]
    fn test_computed_inside_sequence_uses_schema_path() {
        let mut repo = SchemaRepository::new();
        repo.update_schema("aws_security_group", &[("ingress.rule_id", computed)]);
        let schema = repo.get_schema("aws_security_group");

        let state = attrs(json!({"ingress": [{"port": 22}]}));
        let remote = attrs(json!({"ingress": [{"port": 22, "rule_id": "sgr-1"}]}));
        assert!(Differ::new(schema).diff(&state, &remote).is_empty());
    }
}
