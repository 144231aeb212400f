//! Layered agent configuration.
//!
//! # Precedence (lowest first)
//!
//! ```text
//! built-in defaults
//! YAML file          (--config <path>, else $WSAGENT_CONFIG)
//! environment        ($WSAGENT_WORKSPACE_ID, $WSAGENT_PROJECT_NAME, ...)
//! CLI overrides
//! ```
//!
//! # API pattern
//!
//! [`load_with`] takes the environment lookup and home directory explicitly and
//! is what tests call. [`load`] reads the process environment and
//! `dirs::home_dir()`, then delegates.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::types::{AgentConfig, LogFormat, ProjectName, ServiceCommand, WorkspaceId};

pub const ENV_CONFIG: &str = "WSAGENT_CONFIG";
pub const ENV_WORKSPACE_ID: &str = "WSAGENT_WORKSPACE_ID";
pub const ENV_PROJECT_NAME: &str = "WSAGENT_PROJECT_NAME";
pub const ENV_SERVER_API_URL: &str = "WSAGENT_SERVER_API_URL";
pub const ENV_SERVER_API_KEY: &str = "WSAGENT_SERVER_API_KEY";
pub const ENV_PROJECT_DIR: &str = "WSAGENT_PROJECT_DIR";
pub const ENV_LOG_FORMAT: &str = "WSAGENT_LOG_FORMAT";

/// Default remote-shell command: foreground sshd logging to stderr.
pub fn default_ssh_command() -> ServiceCommand {
    ServiceCommand::new("sshd", &["-D", "-e", "-p", "2222"])
}

/// Default mesh-network command: userspace tailscaled.
pub fn default_mesh_command() -> ServiceCommand {
    ServiceCommand::new("tailscaled", &["--tun=userspace-networking"])
}

// ---------------------------------------------------------------------------
// 1. Layers
// ---------------------------------------------------------------------------

/// One partial source of configuration. `None` means "not set here".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub workspace_id: Option<String>,
    pub project_name: Option<String>,
    pub server_api_url: Option<String>,
    pub server_api_key: Option<String>,
    pub project_dir: Option<PathBuf>,
    pub clone_path: Option<PathBuf>,
    pub ssh: Option<ServiceCommand>,
    pub mesh: Option<ServiceCommand>,
    pub log_format: Option<LogFormat>,
}

impl ConfigLayer {
    /// Overlay `over` on top of `self`; fields set in `over` win.
    pub fn merge(self, over: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            workspace_id: over.workspace_id.or(self.workspace_id),
            project_name: over.project_name.or(self.project_name),
            server_api_url: over.server_api_url.or(self.server_api_url),
            server_api_key: over.server_api_key.or(self.server_api_key),
            project_dir: over.project_dir.or(self.project_dir),
            clone_path: over.clone_path.or(self.clone_path),
            ssh: over.ssh.or(self.ssh),
            mesh: over.mesh.or(self.mesh),
            log_format: over.log_format.or(self.log_format),
        }
    }

    /// Build a layer from environment variables. Empty values count as unset.
    ///
    /// An unrecognised `$WSAGENT_LOG_FORMAT` is ignored rather than rejected.
    pub fn from_env<F>(lookup: F) -> ConfigLayer
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        ConfigLayer {
            workspace_id: get(ENV_WORKSPACE_ID),
            project_name: get(ENV_PROJECT_NAME),
            server_api_url: get(ENV_SERVER_API_URL),
            server_api_key: get(ENV_SERVER_API_KEY),
            project_dir: get(ENV_PROJECT_DIR).map(PathBuf::from),
            clone_path: None,
            ssh: None,
            mesh: None,
            log_format: get(ENV_LOG_FORMAT).and_then(|v| parse_log_format(&v)),
        }
    }
}

/// Parse `text` / `json` (case-insensitive).
pub fn parse_log_format(value: &str) -> Option<LogFormat> {
    match value.trim().to_ascii_lowercase().as_str() {
        "text" => Some(LogFormat::Text),
        "json" => Some(LogFormat::Json),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// 2. File
// ---------------------------------------------------------------------------

/// Read a YAML config file into a layer.
///
/// Returns `ConfigError::Io` if the file cannot be read and
/// `ConfigError::Parse` (with path) if it is not valid config YAML.
pub fn read_file(path: &Path) -> Result<ConfigLayer, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if contents.trim().is_empty() {
        return Ok(ConfigLayer::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// 3. Resolve
// ---------------------------------------------------------------------------

/// Fill defaults and validate required fields.
///
/// `project_dir` falls back to `home`; `None` there with no explicit
/// directory is `ConfigError::HomeNotFound`.
pub fn resolve(layer: ConfigLayer, home: Option<&Path>) -> Result<AgentConfig, ConfigError> {
    let workspace_id = required(layer.workspace_id, "workspace_id", ENV_WORKSPACE_ID)?;
    let project_name = required(layer.project_name, "project_name", ENV_PROJECT_NAME)?;
    let server_api_url = required(layer.server_api_url, "server_api_url", ENV_SERVER_API_URL)?;

    let project_dir = match layer.project_dir {
        Some(dir) => dir,
        None => home.map(Path::to_path_buf).ok_or(ConfigError::HomeNotFound)?,
    };

    Ok(AgentConfig {
        workspace_id: WorkspaceId::from(workspace_id),
        project_name: ProjectName::from(project_name),
        server_api_url: server_api_url.trim_end_matches('/').to_string(),
        server_api_key: layer.server_api_key,
        project_dir,
        clone_path: layer.clone_path,
        ssh: layer.ssh.unwrap_or_else(default_ssh_command),
        mesh: layer.mesh.unwrap_or_else(default_mesh_command),
        log_format: layer.log_format.unwrap_or_default(),
    })
}

fn required(
    value: Option<String>,
    field: &'static str,
    env: &'static str,
) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingField { field, env })
}

// ---------------------------------------------------------------------------
// 4. Load
// ---------------------------------------------------------------------------

/// Assemble the full configuration from explicit sources.
///
/// `file` wins over `$WSAGENT_CONFIG` as seen through `lookup`.
pub fn load_with<F>(
    file: Option<&Path>,
    overrides: ConfigLayer,
    lookup: F,
    home: Option<&Path>,
) -> Result<AgentConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let file_path = file
        .map(Path::to_path_buf)
        .or_else(|| lookup(ENV_CONFIG).filter(|v| !v.is_empty()).map(PathBuf::from));

    let file_layer = match file_path {
        Some(path) => read_file(&path)?,
        None => ConfigLayer::default(),
    };
    let env_layer = ConfigLayer::from_env(&lookup);

    resolve(file_layer.merge(env_layer).merge(overrides), home)
}

/// `load_with` convenience wrapper over the process environment.
pub fn load(file: Option<&Path>, overrides: ConfigLayer) -> Result<AgentConfig, ConfigError> {
    let home = dirs::home_dir();
    load_with(
        file,
        overrides,
        |key| std::env::var(key).ok(),
        home.as_deref(),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
