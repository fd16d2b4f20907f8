//! Attribute metadata per resource type
//!
//! The [`SchemaRepository`] is filled once at startup (built-in provider
//! metadata, then user overrides) and only read during analysis.

pub mod metadata;

use bitflags::bitflags;
use std::collections::{BTreeMap, HashMap};

bitflags! {
    /// Per-type flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flags: u32 {
        /// Type needs secondary enumeration calls to be fully read
        const DEEP_MODE = 1;
    }
}

impl Default for Flags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Metadata attached to one attribute path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttributeSchema {
    /// Value may be populated by the provider without being declared
    pub computed: bool,
    /// Raw value is a serialized JSON document
    pub json_string: bool,
}

/// Mutator applied to an attribute's metadata during registration.
pub type AttributeUpdate = fn(&mut AttributeSchema);

/// Mark an attribute as computed.
pub fn computed(attribute: &mut AttributeSchema) {
    attribute.computed = true;
}

/// Mark an attribute as holding a JSON document.
pub fn json_string(attribute: &mut AttributeSchema) {
    attribute.json_string = true;
}

/// Metadata for a single resource type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    /// Attribute metadata keyed by dotted path (sequence indices omitted)
    pub attributes: BTreeMap<String, AttributeSchema>,
    pub flags: Flags,
}

impl Schema {
    /// Metadata registered for `path`, if any.
    ///
    /// An exact registration wins over a `*` pattern.
    pub fn attribute(&self, path: &[&str]) -> Option<&AttributeSchema> {
        if let Some(attribute) = self.attributes.get(&path.join(".")) {
            return Some(attribute);
        }
        self.attributes
            .iter()
            .find(|(pattern, _)| pattern_matches(pattern, path))
            .map(|(_, attribute)| attribute)
    }

    /// Whether `path` or any of its ancestors is computed.
    pub fn is_computed(&self, path: &[&str]) -> bool {
        (1..=path.len()).any(|len| self.attribute(&path[..len]).is_some_and(|a| a.computed))
    }

    /// Whether the value at `path` is a JSON document.
    pub fn is_json_string(&self, path: &[&str]) -> bool {
        self.attribute(path).is_some_and(|a| a.json_string)
    }
}

fn pattern_matches(pattern: &str, path: &[&str]) -> bool {
    let segments: Vec<&str> = pattern.split('.').collect();
    segments.len() == path.len()
        && segments
            .iter()
            .zip(path)
            .all(|(expected, actual)| *expected == "*" || expected == actual)
}

/// Registry of schemas for every known resource type.
#[derive(Debug, Clone, Default)]
pub struct SchemaRepository {
    schemas: HashMap<String, Schema>,
}

impl SchemaRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository holding the built-in provider metadata.
    pub fn with_provider_metadata() -> Self {
        let mut repository = Self::new();
        metadata::register_all(&mut repository);
        repository
    }

    /// Apply metadata mutators to attributes of `ty`.
    ///
    /// Additive: existing metadata is kept and updated in place.
    pub fn update_schema(&mut self, ty: &str, updates: &[(&str, AttributeUpdate)]) {
        for &(path, update) in updates {
            self.update_attribute(ty, path, update);
        }
    }

    /// Apply one mutator to the attribute at dotted `path` of `ty`.
    pub fn update_attribute(
        &mut self,
        ty: &str,
        path: &str,
        update: impl FnOnce(&mut AttributeSchema),
    ) {
        let schema = self.schemas.entry(ty.to_string()).or_default();
        update(schema.attributes.entry(path.to_string()).or_default());
    }

    /// Add flags to the schema of `ty`.
    pub fn update_flags(&mut self, ty: &str, flags: Flags) {
        self.schemas.entry(ty.to_string()).or_default().flags.insert(flags);
    }

    /// Schema of `ty`, `None` for unregistered types.
    pub fn get_schema(&self, ty: &str) -> Option<&Schema> {
        self.schemas.get(ty)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
