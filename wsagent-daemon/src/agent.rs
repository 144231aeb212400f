//! Startup sequence: resolve the project, materialize its repository,
//! configure git identity, then hand over to the connectivity services.
//!
//! Steps run strictly in order. Only control-plane lookups, a missing
//! repository url, and the mesh service itself can fail [`Agent::start`];
//! everything else is best-effort and reported through logs.

use std::sync::Arc;

use wsagent_core::{AgentConfig, Project};

use crate::control_plane::{ApiClient, ControlPlane};
use crate::error::AgentError;
use crate::git::{GitCli, SourceControl};
use crate::resolve::{GitIdentityResolver, ProjectResolver};
use crate::service::{ProcessService, Service};

/// External collaborators the agent drives.
#[derive(Clone)]
pub struct Collaborators {
    pub control_plane: Arc<dyn ControlPlane>,
    pub git: Arc<dyn SourceControl>,
    pub ssh: Arc<dyn Service>,
    pub mesh: Arc<dyn Service>,
}

impl Collaborators {
    /// Production collaborators for `config`.
    pub fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let client = ApiClient::new(&config.server_api_url, config.server_api_key.clone())
            .map_err(AgentError::Client)?;
        Ok(Self {
            control_plane: Arc::new(client),
            git: Arc::new(GitCli::new(config.project_path())),
            ssh: Arc::new(ProcessService::new("ssh", config.ssh.clone())),
            mesh: Arc::new(ProcessService::new("mesh", config.mesh.clone())),
        })
    }
}

pub struct Agent {
    config: AgentConfig,
    collaborators: Collaborators,
}

impl Agent {
    pub fn new(config: AgentConfig, collaborators: Collaborators) -> Self {
        Self {
            config,
            collaborators,
        }
    }

    /// Run the startup sequence once.
    ///
    /// Returns when the mesh service stops; its result is the result of the
    /// whole procedure. The remote shell keeps running on its own task.
    pub async fn start(&self) -> Result<(), AgentError> {
        tracing::info!(
            workspace_id = %self.config.workspace_id,
            project = %self.config.project_name,
            "starting workspace agent"
        );

        let control_plane = self.collaborators.control_plane.as_ref();

        let project = ProjectResolver::new(control_plane)
            .resolve(&self.config.workspace_id, &self.config.project_name)
            .await?;

        let repo_url = project
            .repository
            .url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| AgentError::RepositoryUrlMissing {
                project: project.name.clone(),
            })?;

        let identity = GitIdentityResolver::new(control_plane);
        let provider = identity.provider_for(repo_url).await?;
        let auth_token = provider.as_ref().and_then(|p| p.token.as_deref());

        self.materialize_repository(&project, auth_token).await;

        let user_data = match &provider {
            Some(provider) => identity.user_data(provider).await,
            None => None,
        };

        if let Err(err) = self.collaborators.git.set_git_config(user_data.as_ref()).await {
            tracing::error!(error = %err, "failed to set git config");
        }

        self.spawn_remote_shell();

        let mesh = &self.collaborators.mesh;
        tracing::info!(service = mesh.name(), "starting mesh network service");
        mesh.start().await.map_err(AgentError::Mesh)
    }

    async fn materialize_repository(&self, project: &Project, auth_token: Option<&str>) {
        let git = &self.collaborators.git;
        match git.repository_exists(project).await {
            Err(err) => {
                tracing::error!(error = %err, "failed to check for existing repository; skipping clone");
            }
            Ok(true) => tracing::info!("repository already exists, skipping clone"),
            Ok(false) => {
                tracing::info!(authenticated = auth_token.is_some(), "cloning repository");
                match git.clone_repository(project, auth_token).await {
                    Ok(()) => tracing::info!("repository cloned"),
                    Err(err) => tracing::error!(error = %err, "failed to clone repository"),
                }
            }
        }
    }

    /// Launch the remote shell on a detached task. Failures are only logged.
    fn spawn_remote_shell(&self) {
        let ssh = Arc::clone(&self.collaborators.ssh);
        tokio::spawn(async move {
            if let Err(err) = ssh.start().await {
                tracing::error!(service = ssh.name(), error = %err, "failed to start remote shell");
            }
        });
    }
}
