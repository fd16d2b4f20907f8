//! `driftscan scan`
//!
//! Loads the snapshots, enumerates live resources, reconciles and compares
//! them, then writes the analysis. Drift is not an error: it only changes
//! the exit status.

use crate::cli::ScanArgs;
use crate::config::SchemaConfig;
use crate::progress::Heartbeat;
use crate::{input, output, ui, Context, EXIT_DRIFT, EXIT_IN_SYNC};
use anyhow::{Context as _, Result};
use driftkit::{DRIFTIGNORE_FILE, DriftIgnore, Engine, SchemaRepository};
use std::path::Path;

pub fn run(ctx: &Context, args: ScanArgs) -> Result<u8> {
    let output = output::from_spec(&args.output, ctx.verbose > 0)?;
    // With JSON on stdout nothing else may be printed there.
    let show_info = output.info_enabled() && !ctx.quiet;

    let mut schemas = SchemaRepository::with_provider_metadata();
    if let Some(path) = &args.schema {
        SchemaConfig::load(path)?.apply(&mut schemas);
    }

    let filter = match &args.driftignore {
        Some(path) => DriftIgnore::from_file(path),
        None => DriftIgnore::from_file(Path::new(DRIFTIGNORE_FILE)),
    };
    log::debug!("Loaded {} ignore rules", filter.len());

    let scanner = input::remote_scanner(&args.remote, args.jobs)?;
    let state = input::load_state(&args.state)?;

    let spinner_visible = show_info && console::Term::stdout().is_term();
    let mut heartbeat = Heartbeat::start("Scanning resources", spinner_visible);
    let scan = scanner.scan(&heartbeat);
    heartbeat.stop();
    log::debug!("Scan reported {} completed enumerators", heartbeat.count());
    let scan = scan.context("Failed to enumerate remote resources")?;

    if show_info {
        ui::info(&format!(
            "Enumerated {} with {}",
            ui::count(scan.resources.len(), "remote resource"),
            ui::count(scanner.len(), "enumerator")
        ));
        if !scan.alerts.is_empty() && !matches!(args.output.split_once("://"), Some(("console", _))) {
            ui::warn(&format!(
                "{} could not be fully enumerated, see alerts in the output",
                ui::count(scan.alerts.len(), "resource type")
            ));
        }
    }

    let engine = Engine::new(schemas, filter);
    let analysis = engine
        .run(scan.resources, state, scan.alerts)
        .context("Drift analysis failed")?;

    output.write(&analysis)?;

    Ok(if analysis.is_sync() {
        EXIT_IN_SYNC
    } else {
        EXIT_DRIFT
    })
}
