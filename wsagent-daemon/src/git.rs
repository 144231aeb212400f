//! Local source-control operations: existence check, clone, author identity.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tokio::process::Command;

use wsagent_core::{GitUserData, Project};

use crate::error::{io_err, GitError};

/// Username paired with a provider token for HTTP basic auth.
const TOKEN_USERNAME: &str = "wsagent";

/// Source-control operations the agent performs on the project checkout.
#[async_trait]
pub trait SourceControl: Send + Sync {
    /// Whether the project's repository is already present locally.
    async fn repository_exists(&self, project: &Project) -> Result<bool, GitError>;

    /// Clone the project's repository, authenticating with `auth_token` if given.
    async fn clone_repository(
        &self,
        project: &Project,
        auth_token: Option<&str>,
    ) -> Result<(), GitError>;

    /// Write the author identity into the user's git configuration.
    async fn set_git_config(&self, user_data: Option<&GitUserData>) -> Result<(), GitError>;
}

/// [`SourceControl`] backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
    clone_path: PathBuf,
}

impl GitCli {
    pub fn new(clone_path: impl Into<PathBuf>) -> Self {
        Self {
            program: "git".to_string(),
            clone_path: clone_path.into(),
        }
    }

    /// Use a different git executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    async fn run(&self, mut command: Command, label: String) -> Result<(), GitError> {
        let output = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| GitError::Spawn {
                command: label.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        Err(GitError::Command {
            command: label,
            detail: command_output_detail(&output.stdout, &output.stderr),
        })
    }
}

#[async_trait]
impl SourceControl for GitCli {
    async fn repository_exists(&self, _project: &Project) -> Result<bool, GitError> {
        let dot_git = self.clone_path.join(".git");
        match tokio::fs::metadata(&dot_git).await {
            // `.git` is a file inside worktrees
            Ok(_) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(io_err(dot_git, err)),
        }
    }

    async fn clone_repository(
        &self,
        project: &Project,
        auth_token: Option<&str>,
    ) -> Result<(), GitError> {
        let url = project
            .repository
            .url
            .as_deref()
            .ok_or_else(|| GitError::Command {
                command: "git clone".to_string(),
                detail: format!("project '{}' has no repository url", project.name),
            })?;

        if let Some(parent) = self.clone_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_err(parent, e))?;
        }

        let mut command = Command::new(&self.program);
        // token must stay out of argv and the stored remote url
        if let Some(token) = auth_token {
            command
                .env("GIT_CONFIG_COUNT", "1")
                .env("GIT_CONFIG_KEY_0", "http.extraHeader")
                .env("GIT_CONFIG_VALUE_0", auth_header(token));
        }
        command.arg("clone");
        if let Some(branch) = project.repository.branch.as_deref() {
            command.args(["--branch", branch]);
        }
        command.arg(url).arg(&self.clone_path);

        self.run(command, "git clone".to_string()).await
    }

    async fn set_git_config(&self, user_data: Option<&GitUserData>) -> Result<(), GitError> {
        let Some(user_data) = user_data else {
            tracing::debug!("no git user data; leaving git identity unchanged");
            return Ok(());
        };

        let entries = [
            ("user.name", user_data.name.as_deref()),
            ("user.email", user_data.email.as_deref()),
        ];
        // every key is attempted; the first failure is reported
        let mut first_err = None;
        for (key, value) in entries {
            let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
                continue;
            };
            let mut command = Command::new(&self.program);
            command.args(["config", "--global", key, value]);
            if let Err(err) = self.run(command, format!("git config {key}")).await {
                tracing::warn!(key, error = %err, "failed to write git config entry");
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

/// `Authorization` header value for token-authenticated HTTP git.
pub fn auth_header(token: &str) -> String {
    let credentials = STANDARD.encode(format!("{TOKEN_USERNAME}:{token}"));
    format!("Authorization: Basic {credentials}")
}

/// Extracts the best human-readable error detail from command output.
fn command_output_detail(stdout: &[u8], stderr: &[u8]) -> String {
    let stderr_text = String::from_utf8_lossy(stderr).trim().to_string();
    if !stderr_text.is_empty() {
        return stderr_text;
    }

    let stdout_text = String::from_utf8_lossy(stdout).trim().to_string();
    if !stdout_text.is_empty() {
        return stdout_text;
    }

    "Unknown git error".to_string()
}
