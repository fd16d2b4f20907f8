//! # Driftkit
//!
//! Drift analysis between declared infrastructure state and live resources.
//!
//! Two resource sets go in: what IaC state declares and what was enumerated
//! from the provider. One [`Analysis`] comes out, classifying resources as
//! managed, unmanaged or deleted and listing leaf-level attribute drift of
//! the managed ones.
//!
//! ## Core Concepts
//!
//! - **Resource**: a `(type, id)` identity plus a normalized attribute tree
//! - **SchemaRepository**: per-type attribute metadata (computed, JSON string)
//! - **Middleware**: reconciles provider-specific shape mismatches before comparison
//! - **DriftIgnore**: user rules suppressing whole resources or single fields
//! - **Analyzer**: classifies and diffs the reconciled sets
//! - **RemoteScanner**: runs enumerators in parallel, turning access denials into alerts
//!
//! ## Example
//!
//! ```ignore
//! use driftkit::{Alerts, DriftIgnore, Engine, Resource, SchemaRepository};
//!
//! let engine = Engine::new(
//!     SchemaRepository::with_provider_metadata(),
//!     DriftIgnore::from_file(".driftignore".as_ref()),
//! );
//!
//! let remote = vec![Resource::new("aws_s3_bucket", "logs")];
//! let state = vec![Resource::new("aws_s3_bucket", "assets")];
//!
//! let analysis = engine.run(remote, state, Alerts::new())?;
//! assert_eq!(analysis.summary().total_unmanaged, 1);
//! assert_eq!(analysis.summary().total_deleted, 1);
//! ```
//!
//! Comparison is synchronous and performs no I/O. Only enumeration runs
//! workers, and it completes before analysis starts.

pub mod alerter;
pub mod analyser;
pub mod analysis;
pub mod engine;
pub mod enumeration;
pub mod error;
pub mod filter;
pub mod middleware;
pub mod resource;
pub mod schema;

// Re-export main types at crate root
pub use alerter::{Alert, Alerter, Alerts};
pub use analyser::{Analyzer, Differ};
pub use analysis::{Analysis, Change, ChangeKind, Difference, Summary};
pub use engine::Engine;
pub use enumeration::{
    Enumerator, NoProgress, RemoteScanner, ScanOutput, ScanProgress, StaticEnumerator,
};
pub use error::{EnumerationError, Error, Result};
pub use filter::{DRIFTIGNORE_FILE, DriftIgnore};
pub use middleware::{Chain, Middleware};
pub use resource::{Attributes, Resource, ResourceKey};
pub use schema::{AttributeSchema, Flags, Schema, SchemaRepository};
