//! wsagent — per-workspace development agent.
//!
//! # Usage
//!
//! ```text
//! wsagent start  [--config <path>] [--workspace-id <id>] [--project-name <name>] ...
//! wsagent config [--config <path>] [...]
//! ```
//!
//! Every flag can also come from the config file or a `WSAGENT_*` variable.

mod commands;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{config::ConfigCommandArgs, start::StartArgs};
use wsagent_core::{config::parse_log_format, LogFormat};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "wsagent",
    version,
    about = "Bring a development workspace online and keep it connected",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve the project, clone it, configure git, then run the connectivity services.
    Start(StartArgs),

    /// Print the resolved configuration (secrets redacted).
    Config(ConfigCommandArgs),
}

// ---------------------------------------------------------------------------
// Shared LogFormat argument
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `LogFormat` from CLI args.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFormatArg(pub LogFormat);

impl FromStr for LogFormatArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        parse_log_format(s)
            .map(Self)
            .ok_or_else(|| format!("unknown log format '{s}'; expected: text, json"))
    }
}

impl fmt::Display for LogFormatArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        arg.0
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Start(args) => args.run(),
        Commands::Config(args) => args.run(),
    }
}
