//! Analysis output destinations
//!
//! Selected with `--output`: `console://` prints a human summary,
//! `json://PATH` writes the analysis as JSON (`stdout` or `/dev/stdout` for
//! standard output).

mod console;
mod json;

pub use console::ConsoleOutput;
pub use json::JsonOutput;

use anyhow::{bail, Result};
use driftkit::Analysis;
use std::path::PathBuf;

pub trait Output {
    /// Write the analysis to the destination.
    fn write(&self, analysis: &Analysis) -> Result<()>;

    /// Whether progress and info messages may be printed to stdout.
    fn info_enabled(&self) -> bool;
}

/// Build an output from its `scheme://target` form.
pub fn from_spec(spec: &str, verbose: bool) -> Result<Box<dyn Output>> {
    let Some((scheme, target)) = spec.split_once("://") else {
        bail!("Invalid output '{spec}', expected console:// or json://PATH");
    };

    match scheme {
        "console" => Ok(Box::new(ConsoleOutput::new(verbose))),
        "json" => {
            if target.is_empty() {
                bail!("Missing path in output '{spec}', expected json://PATH");
            }
            Ok(Box::new(JsonOutput::new(json_destination(target))))
        }
        _ => bail!("Unsupported output '{scheme}', expected console:// or json://PATH"),
    }
}

/// `None` means standard output.
fn json_destination(target: &str) -> Option<PathBuf> {
    match target {
        "stdout" | "/dev/stdout" => None,
        path => Some(PathBuf::from(path)),
    }
}
