//! Snapshot files read by `scan`
//!
//! A remote snapshot is an export of live resources for one provider:
//!
//! ```json
//! {"provider": "aws", "resources": [...], "denied": ["aws_iam_access_key"]}
//! ```
//!
//! A state snapshot is a JSON array of declared resources.

use anyhow::{Context, Result};
use driftkit::{RemoteScanner, Resource, StaticEnumerator};
use rayon::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct RemoteSnapshot {
    pub provider: String,

    #[serde(default)]
    pub resources: Vec<Resource>,

    /// Types the provider refused to list
    #[serde(default)]
    pub denied: Vec<String>,
}

impl RemoteSnapshot {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read remote snapshot {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid remote snapshot format in {}", path.display()))
    }

    /// One enumerator per resource type, plus one refusing enumerator per
    /// denied type.
    pub fn into_enumerators(self) -> Vec<StaticEnumerator> {
        let mut by_type: BTreeMap<String, Vec<Resource>> = BTreeMap::new();
        for res in self.resources {
            by_type.entry(res.ty.clone()).or_default().push(res);
        }

        let mut enumerators: Vec<StaticEnumerator> = by_type
            .into_iter()
            .map(|(ty, resources)| StaticEnumerator::new(&self.provider, ty, resources))
            .collect();
        enumerators.extend(
            self.denied
                .iter()
                .map(|ty| StaticEnumerator::denied(&self.provider, ty)),
        );
        enumerators
    }
}

/// Build a scanner over every remote snapshot.
pub fn remote_scanner(paths: &[PathBuf], jobs: usize) -> Result<RemoteScanner> {
    let mut scanner = RemoteScanner::new().with_jobs(jobs);
    for path in paths {
        let snapshot = RemoteSnapshot::load(path)?;
        log::debug!(
            "Remote snapshot {} ({}): {} resources, {} denied types",
            path.display(),
            snapshot.provider,
            snapshot.resources.len(),
            snapshot.denied.len()
        );
        for enumerator in snapshot.into_enumerators() {
            scanner.add(Box::new(enumerator));
        }
    }
    Ok(scanner)
}

/// Read and merge every state snapshot.
pub fn load_state(paths: &[PathBuf]) -> Result<Vec<Resource>> {
    let loaded: Vec<Result<Vec<Resource>>> = paths.par_iter().map(|p| load_state_file(p)).collect();

    let mut resources = Vec::new();
    for state in loaded {
        resources.extend(state?);
    }
    log::debug!("Read {} declared resources from {} files", resources.len(), paths.len());
    Ok(resources)
}

fn load_state_file(path: &Path) -> Result<Vec<Resource>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Could not read state file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid state file format in {}", path.display()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use driftkit::NoProgress;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const REMOTE: &str = r#"{
        "provider": "aws",
        "resources": [
            {"type": "aws_vpc", "id": "vpc-2", "attributes": {"cidr_block": "10.1.0.0/16"}},
            {"type": "aws_s3_bucket", "id": "logs"},
            {"type": "aws_vpc", "id": "vpc-1"}
        ],
        "denied": ["aws_iam_access_key"]
    }"#;

    #[test]
    fn test_remote_snapshot_enumerators() {
        let snapshot: RemoteSnapshot = serde_json::from_str(REMOTE).unwrap();
        let enumerators = snapshot.into_enumerators();
        assert_eq!(enumerators.len(), 3);
    }

    #[test]
    fn test_remote_scanner_from_files() {
        let file = write_json(REMOTE);
        let scanner = remote_scanner(&[file.path().to_path_buf()], 2).unwrap();
        let output = scanner.scan(&NoProgress).unwrap();

        let keys: Vec<String> = output.resources.iter().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["aws_s3_bucket.logs", "aws_vpc.vpc-1", "aws_vpc.vpc-2"]);
        assert!(output.alerts.contains_key("aws_iam_access_key"));
    }

    #[test]
    fn test_remote_snapshot_defaults() {
        let snapshot: RemoteSnapshot = serde_json::from_str(r#"{"provider": "github"}"#).unwrap();
        assert!(snapshot.resources.is_empty());
        assert!(snapshot.denied.is_empty());
    }

    #[test]
    fn test_load_state_merges_files() {
        let a = write_json(r#"[{"type": "aws_vpc", "id": "vpc-1", "attributes": {}}]"#);
        let b = write_json(r#"[{"type": "aws_s3_bucket", "id": "logs"}]"#);

        let resources = load_state(&[a.path().to_path_buf(), b.path().to_path_buf()]).unwrap();
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].id(), "vpc-1");
        assert_eq!(resources[1].id(), "logs");
    }

    #[test]
    fn test_invalid_state_file() {
        let file = write_json(r#"{"not": "an array"}"#);
        let err = load_state(&[file.path().to_path_buf()]).unwrap_err();
        assert!(err.to_string().contains("Invalid state file format"));
    }

    #[test]
    fn test_missing_remote_file() {
        let err = remote_scanner(&[PathBuf::from("/nonexistent/aws.json")], 0).unwrap_err();
        assert!(err.to_string().contains("Could not read remote snapshot"));
    }
}
