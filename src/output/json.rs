use super::Output;
use anyhow::{Context, Result};
use driftkit::Analysis;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

/// Writes the analysis as tab-indented JSON.
pub struct JsonOutput {
    /// `None` writes to stdout
    path: Option<PathBuf>,
}

impl JsonOutput {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl Output for JsonOutput {
    fn write(&self, analysis: &Analysis) -> Result<()> {
        let content = render(analysis)?;

        let Some(path) = &self.path else {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&content).context("Failed to write analysis to stdout")?;
            return stdout.flush().context("Failed to write analysis to stdout");
        };

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options
            .open(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        file.write_all(&content)
            .with_context(|| format!("Failed to write output file: {}", path.display()))?;

        log::debug!("Wrote analysis to {}", path.display());
        Ok(())
    }

    fn info_enabled(&self) -> bool {
        self.path.is_some()
    }
}

fn render(analysis: &Analysis) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"\t"));
    analysis
        .serialize(&mut serializer)
        .context("Failed to serialize analysis")?;
    buf.push(b'\n');
    Ok(buf)
}
