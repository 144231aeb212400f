//! Control-plane lookups the startup sequence depends on.

use wsagent_core::{gitprovider, GitProvider, GitUserData, Project, ProjectName, WorkspaceId};

use crate::control_plane::ControlPlane;
use crate::error::AgentError;

/// Maps a workspace id and project name to the project's metadata.
pub struct ProjectResolver<'a> {
    client: &'a dyn ControlPlane,
}

impl<'a> ProjectResolver<'a> {
    pub fn new(client: &'a dyn ControlPlane) -> Self {
        Self { client }
    }

    /// Fetch the workspace and return its first project named `project_name`.
    ///
    /// # Errors
    /// `AgentError::Lookup` if the workspace fetch fails,
    /// `AgentError::ProjectNotFound` if no project has that name.
    pub async fn resolve(
        &self,
        workspace_id: &WorkspaceId,
        project_name: &ProjectName,
    ) -> Result<Project, AgentError> {
        let workspace = self
            .client
            .get_workspace(workspace_id)
            .await
            .map_err(|source| AgentError::Lookup {
                what: "workspace",
                source,
            })?;

        workspace
            .project(project_name)
            .cloned()
            .ok_or_else(|| AgentError::ProjectNotFound {
                workspace: workspace_id.clone(),
                project: project_name.clone(),
            })
    }
}

/// Maps a repository URL to its git provider and that provider's user identity.
pub struct GitIdentityResolver<'a> {
    client: &'a dyn ControlPlane,
}

impl<'a> GitIdentityResolver<'a> {
    pub fn new(client: &'a dyn ControlPlane) -> Self {
        Self { client }
    }

    /// Provider whose host serves `repo_url`, or `None` when nothing matches.
    ///
    /// # Errors
    /// `AgentError::Lookup` if the server config cannot be fetched.
    pub async fn provider_for(&self, repo_url: &str) -> Result<Option<GitProvider>, AgentError> {
        let config = self
            .client
            .get_server_config()
            .await
            .map_err(|source| AgentError::Lookup {
                what: "server config",
                source,
            })?;

        let provider = gitprovider::provider_for_url(repo_url, &config.git_providers).cloned();
        match &provider {
            Some(p) => tracing::info!(provider = %p.id, "matched git provider"),
            None => tracing::info!("no git provider matches repository host"),
        }
        Ok(provider)
    }

    /// User identity for `provider`. Lookup failures are logged and yield `None`.
    pub async fn user_data(&self, provider: &GitProvider) -> Option<GitUserData> {
        match self.client.get_git_user_data(&provider.id).await {
            Ok(data) => data,
            Err(err) => {
                tracing::error!(provider = %provider.id, error = %err, "failed to get git user data");
                None
            }
        }
    }
}
