//! Drift suppression rules

pub mod driftignore;
pub mod escape;

pub use driftignore::{DRIFTIGNORE_FILE, DriftIgnore};
pub use escape::{escapable_split, escape_segment, join_escaped};
