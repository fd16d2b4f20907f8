use anyhow::{Context, Result};
use driftkit::schema::{computed, json_string, Flags, SchemaRepository};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

// ============================================================================
// Schema Metadata
// ============================================================================

/// User supplied schema metadata, applied on top of the built-in provider
/// metadata.
///
/// ```toml
/// [types.aws_instance]
/// computed = ["tags_all"]
/// json_string = ["user_data_json"]
/// deep_mode = false
/// ```
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub types: BTreeMap<String, TypeConfig>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TypeConfig {
    /// Attribute paths populated by the provider
    #[serde(default)]
    pub computed: Vec<String>,

    /// Attribute paths holding serialized JSON documents
    #[serde(default)]
    pub json_string: Vec<String>,

    #[serde(default)]
    pub deep_mode: bool,
}

impl SchemaConfig {
    /// Load schema metadata from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema file: {}", path.display()))?;

        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse schema file: {}", path.display()))?;

        log::debug!(
            "Loaded schema metadata for {} types from {}",
            config.types.len(),
            path.display()
        );
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Merge into `repository`. Existing metadata is kept.
    pub fn apply(&self, repository: &mut SchemaRepository) {
        for (ty, config) in &self.types {
            for path in &config.computed {
                repository.update_attribute(ty, path, computed);
            }
            for path in &config.json_string {
                repository.update_attribute(ty, path, json_string);
            }
            if config.deep_mode {
                repository.update_flags(ty, Flags::DEEP_MODE);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
