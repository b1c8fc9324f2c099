pub mod run;
pub mod validate;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use diagr_common::config::{RunConfig, UnknownTypePolicy};

#[derive(Parser)]
#[command(name = "diagr")]
#[command(about = "Concurrent remote machine diagnostics.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run diagnostics for every machine in a configuration file
    #[command(alias = "r")]
    Run(RunArgs),
    /// Check a configuration file without probing anything
    #[command(alias = "v")]
    Validate {
        /// Path to the JSON machine configuration
        config: PathBuf,
    },
}

#[derive(Args)]
pub struct RunArgs {
    /// Path to the JSON machine configuration
    pub config: PathBuf,

    /// Maximum number of probes running at once
    #[arg(long, default_value_t = 10)]
    pub concurrency: usize,

    /// Per-machine probe budget in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Wall-clock budget for the whole batch in seconds
    #[arg(long)]
    pub deadline_secs: Option<u64>,

    /// Reject unknown machine types instead of probing them generically
    #[arg(long)]
    pub strict_types: bool,

    /// Also write the report to this path as CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl RunArgs {
    pub fn to_run_config(&self) -> RunConfig {
        RunConfig {
            concurrency_limit: self.concurrency,
            probe_timeout: Duration::from_secs(self.timeout_secs),
            batch_deadline: self.deadline_secs.map(Duration::from_secs),
            unknown_types: if self.strict_types {
                UnknownTypePolicy::Reject
            } else {
                UnknownTypePolicy::Fallback
            },
        }
    }
}
