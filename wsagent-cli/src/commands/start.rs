//! `wsagent start` — run the startup sequence in the foreground.

use anyhow::{Context, Result};
use clap::Args;

use super::ConfigArgs;

#[derive(Args, Debug)]
pub struct StartArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

impl StartArgs {
    pub fn run(self) -> Result<()> {
        let config = self.config.load()?;
        wsagent_daemon::start_blocking(config).context("agent exited with error")
    }
}
