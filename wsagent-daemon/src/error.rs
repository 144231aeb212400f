use std::path::PathBuf;

use thiserror::Error;

use wsagent_core::{ProjectName, WorkspaceId};

/// Failures that abort agent startup.
///
/// Collaborator failures on best-effort steps (clone, git config, user data,
/// remote shell) are logged and never surface here.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("failed to fetch {what}: {source}")]
    Lookup {
        what: &'static str,
        #[source]
        source: ClientError,
    },

    #[error("project '{project}' not found in workspace '{workspace}'")]
    ProjectNotFound {
        workspace: WorkspaceId,
        project: ProjectName,
    },

    #[error("repository url not found for project '{project}'")]
    RepositoryUrlMissing { project: ProjectName },

    #[error("mesh network service failed: {0}")]
    Mesh(#[source] ServiceError),

    #[error("control-plane client setup failed: {0}")]
    Client(#[source] ClientError),

    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Control-plane request failures.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid control-plane url '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} returned HTTP {code}: {body}")]
    Status { url: String, code: u16, body: String },

    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("blocking request task failed: {0}")]
    Join(String),
}

/// Local source-control failures.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to execute {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} failed: {detail}")]
    Command { command: String, detail: String },
}

/// Long-running service failures.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("failed to launch {service} ({program}): {source}")]
    Spawn {
        service: String,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{service} exited with {status}")]
    Exited { service: String, status: String },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> GitError {
    GitError::Io {
        path: path.into(),
        source,
    }
}
