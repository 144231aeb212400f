//! Domain types shared by the agent runtime and the control-plane client.
//!
//! Control-plane payloads use camelCase field names on the wire.
//! All path fields use `PathBuf`.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Identifier of the workspace this agent serves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct WorkspaceId(pub String);

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for WorkspaceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for WorkspaceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Name of a project inside a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct ProjectName(pub String);

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ProjectName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProjectName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Identifier of a git provider configured on the server (`github`, `gitlab`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderId(pub String);

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ProviderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProviderId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Control-plane payloads
// ---------------------------------------------------------------------------

/// Repository metadata attached to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// One source repository and its metadata within a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: ProjectName,
    #[serde(default)]
    pub repository: Repository,
}

/// A development environment instance and its projects, in server order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: WorkspaceId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl Workspace {
    /// First project whose name equals `name`.
    pub fn project(&self, name: &ProjectName) -> Option<&Project> {
        self.projects.iter().find(|p| &p.name == name)
    }
}

/// A source-control host known to the control plane.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitProvider {
    pub id: ProviderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// API endpoint of a self-managed instance; absent for the public hosts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_api_url: Option<String>,
}

// Hand-written so tokens never reach log output.
impl fmt::Debug for GitProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitProvider")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("base_api_url", &self.base_api_url)
            .finish()
    }
}

/// Server-wide configuration as returned by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default)]
    pub git_providers: Vec<GitProvider>,
}

/// Author identity for a git provider account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GitUserData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

// ---------------------------------------------------------------------------
// Agent configuration
// ---------------------------------------------------------------------------

/// A program plus arguments used to launch a long-running service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ServiceCommand {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| (*a).to_owned()).collect(),
        }
    }
}

impl fmt::Display for ServiceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Immutable process configuration, fixed at construction.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub workspace_id: WorkspaceId,
    pub project_name: ProjectName,
    pub server_api_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_api_key: Option<String>,
    /// Root directory projects are cloned under.
    pub project_dir: PathBuf,
    /// Overrides `<project_dir>/<project_name>` as the clone target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clone_path: Option<PathBuf>,
    pub ssh: ServiceCommand,
    pub mesh: ServiceCommand,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl AgentConfig {
    /// Local directory the project repository lives in.
    pub fn project_path(&self) -> PathBuf {
        match &self.clone_path {
            Some(path) => path.clone(),
            None => self.project_dir.join(&self.project_name.0),
        }
    }

    /// Copy safe to print: secrets replaced by a placeholder.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.server_api_key.is_some() {
            copy.server_api_key = Some("<redacted>".to_string());
        }
        copy
    }
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = self.redacted();
        f.debug_struct("AgentConfig")
            .field("workspace_id", &redacted.workspace_id)
            .field("project_name", &redacted.project_name)
            .field("server_api_url", &redacted.server_api_url)
            .field("server_api_key", &redacted.server_api_key)
            .field("project_dir", &redacted.project_dir)
            .field("clone_path", &redacted.clone_path)
            .field("ssh", &redacted.ssh)
            .field("mesh", &redacted.mesh)
            .field("log_format", &redacted.log_format)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
