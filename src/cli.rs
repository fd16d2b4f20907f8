use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "driftscan")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Detect drift between declared infrastructure and live resources", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare declared state with live resources
    Scan(ScanArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Remote snapshot file (JSON), one per provider export
    #[arg(long = "remote", value_name = "FILE", required = true)]
    pub remote: Vec<PathBuf>,

    /// Declared state file (JSON array of resources)
    #[arg(long = "state", value_name = "FILE", required = true)]
    pub state: Vec<PathBuf>,

    /// Ignore rules file [default: .driftignore in the working directory]
    #[arg(long, value_name = "PATH", env = "DRIFTSCAN_DRIFTIGNORE")]
    pub driftignore: Option<PathBuf>,

    /// Extra schema metadata (TOML)
    #[arg(long, value_name = "PATH", env = "DRIFTSCAN_SCHEMA")]
    pub schema: Option<PathBuf>,

    /// Output destination: console:// or json://PATH
    #[arg(short, long, default_value = "console://", env = "DRIFTSCAN_OUTPUT")]
    pub output: String,

    /// Number of parallel enumeration jobs (0 = one per CPU)
    #[arg(short, long, default_value = "0")]
    pub jobs: usize,
}
