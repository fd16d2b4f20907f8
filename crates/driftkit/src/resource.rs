//! Resource model for drift analysis
//!
//! A [`Resource`] is a `(type, id)` identity plus a normalized attribute tree.
//! The tree is provider-agnostic: every resource, whether it was enumerated
//! from a live API or read from IaC state, is reduced to the same nested
//! mapping of scalars, sequences and mappings before comparison.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Identity of a resource: unique within a set, matched exactly across sets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceKey {
    /// Resource type, e.g. "aws_s3_bucket"
    #[serde(rename = "type")]
    pub ty: String,
    /// Provider identifier of the resource
    pub id: String,
}

impl ResourceKey {
    pub fn new(ty: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.ty, self.id)
    }
}

/// Normalized attribute tree of a resource.
///
/// Lookups never fail: a path that does not exist yields `None`. JSON `null`
/// is treated as absent, while an empty string, map or sequence is a present
/// value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(Map<String, Value>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the value at `path`.
    ///
    /// Segments address mapping keys; a numeric segment indexes a sequence.
    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.0.get(*first)?;
        for segment in rest {
            current = child(current, segment)?;
        }
        if current.is_null() { None } else { Some(current) }
    }

    /// String value at `path`, `None` if absent or not a string.
    pub fn get_string(&self, path: &[&str]) -> Option<&str> {
        self.get(path)?.as_str()
    }

    /// Boolean value at `path`, `None` if absent or not a boolean.
    pub fn get_bool(&self, path: &[&str]) -> Option<bool> {
        self.get(path)?.as_bool()
    }

    /// Nested mapping at `path`, `None` if absent or not a mapping.
    pub fn get_map(&self, path: &[&str]) -> Option<&Map<String, Value>> {
        self.get(path)?.as_object()
    }

    /// Sequence at `path`, `None` if absent or not a sequence.
    pub fn get_slice(&self, path: &[&str]) -> Option<&[Value]> {
        self.get(path)?.as_array().map(Vec::as_slice)
    }

    /// Set the value at `path`, creating intermediate mappings as needed.
    ///
    /// Intermediate values that are not mappings are replaced.
    pub fn set(&mut self, path: &[&str], value: Value) {
        let Some((last, parents)) = path.split_last() else {
            return;
        };
        let mut map = &mut self.0;
        for segment in parents {
            let entry = map
                .entry((*segment).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            map = match entry {
                Value::Object(inner) => inner,
                _ => return,
            };
        }
        map.insert((*last).to_string(), value);
    }

    /// Remove and return the value at `path`.
    pub fn remove(&mut self, path: &[&str]) -> Option<Value> {
        let (last, parents) = path.split_last()?;
        let mut map = &mut self.0;
        for segment in parents {
            map = map.get_mut(*segment)?.as_object_mut()?;
        }
        map.remove(*last)
    }

    /// Top-level mapping of the tree.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Attributes {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn child<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => items.get(segment.parse::<usize>().ok()?),
        _ => None,
    }
}

/// A cloud resource, either enumerated live or read from declared state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource type, e.g. "aws_s3_bucket"
    #[serde(rename = "type")]
    pub ty: String,
    /// Provider identifier of the resource
    pub id: String,
    /// Normalized attribute tree
    #[serde(default)]
    pub attributes: Attributes,
}

impl Resource {
    /// Create a resource with no attributes.
    pub fn new(ty: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            id: id.into(),
            attributes: Attributes::new(),
        }
    }

    /// Replace the attribute tree.
    pub fn with_attributes(mut self, attributes: impl Into<Attributes>) -> Self {
        self.attributes = attributes.into();
        self
    }

    pub fn ty(&self) -> &str {
        &self.ty
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Identity of this resource.
    pub fn key(&self) -> ResourceKey {
        ResourceKey::new(self.ty.clone(), self.id.clone())
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.ty, self.id)
    }
}

/// Sort resources by `(type, id)`.
pub fn sort_resources(resources: &mut [Resource]) {
    resources.sort_by(|a, b| (a.ty.as_str(), a.id.as_str()).cmp(&(b.ty.as_str(), b.id.as_str())));
}
