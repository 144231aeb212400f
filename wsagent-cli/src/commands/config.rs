//! `wsagent config` — show the merged configuration.

use anyhow::{Context, Result};
use clap::Args;

use super::ConfigArgs;

#[derive(Args, Debug)]
pub struct ConfigCommandArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

impl ConfigCommandArgs {
    pub fn run(self) -> Result<()> {
        let config = self.config.load()?;
        let yaml = serde_yaml::to_string(&config.redacted())
            .context("failed to render configuration")?;
        print!("{yaml}");
        println!("project_path: {}", config.project_path().display());
        Ok(())
    }
}
