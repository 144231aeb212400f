pub mod config;
pub mod start;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use wsagent_core::{config::ConfigLayer, AgentConfig};

use crate::LogFormatArg;

/// Configuration flags shared by every subcommand. Flags win over
/// `WSAGENT_*` variables, which win over the config file.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// YAML config file (defaults to $WSAGENT_CONFIG when set).
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Workspace this agent serves.
    #[arg(long)]
    pub workspace_id: Option<String>,

    /// Project within the workspace to bring up.
    #[arg(long, short = 'p')]
    pub project_name: Option<String>,

    /// Control-plane base URL.
    #[arg(long, value_name = "URL")]
    pub server_api_url: Option<String>,

    /// Control-plane API key.
    #[arg(long, value_name = "KEY")]
    pub server_api_key: Option<String>,

    /// Directory projects are cloned under.
    #[arg(long, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    /// Exact clone target, overriding <project-dir>/<project-name>.
    #[arg(long, value_name = "DIR")]
    pub clone_path: Option<PathBuf>,

    /// Log output: text | json.
    #[arg(long, value_name = "FORMAT")]
    pub log_format: Option<LogFormatArg>,
}

impl ConfigArgs {
    fn overrides(&self) -> ConfigLayer {
        ConfigLayer {
            workspace_id: self.workspace_id.clone(),
            project_name: self.project_name.clone(),
            server_api_url: self.server_api_url.clone(),
            server_api_key: self.server_api_key.clone(),
            project_dir: self.project_dir.clone(),
            clone_path: self.clone_path.clone(),
            ssh: None,
            mesh: None,
            log_format: self.log_format.map(Into::into),
        }
    }

    /// Merge all configuration sources into the final agent config.
    pub fn load(&self) -> Result<AgentConfig> {
        wsagent_core::config::load(self.config.as_deref(), self.overrides())
            .context("failed to load agent configuration")
    }
}
