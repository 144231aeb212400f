//! Recording fakes for every collaborator the agent drives.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use wsagent_core::{
    config::{default_mesh_command, default_ssh_command},
    AgentConfig, GitProvider, GitUserData, LogFormat, Project, ProjectName, ProviderId,
    Repository, ServerConfig, Workspace, WorkspaceId,
};
use wsagent_daemon::{
    Agent, ClientError, Collaborators, ControlPlane, GitError, Service, ServiceError,
    SourceControl,
};

pub const REPO_URL: &str = "https://git.example.com/org/app";

/// One observed collaborator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetWorkspace(String),
    GetServerConfig,
    GetGitUserData(String),
    RepositoryExists,
    CloneRepository { token: Option<String> },
    SetGitConfig(Option<GitUserData>),
    StartShell,
    StartMesh,
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

fn record(log: &CallLog, call: Call) {
    log.lock().expect("call log").push(call);
}

fn unavailable(what: &str) -> ClientError {
    ClientError::Transport {
        url: format!("http://control-plane/{what}"),
        message: "connection refused".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Control plane
// ---------------------------------------------------------------------------

pub struct FakeControlPlane {
    log: CallLog,
    /// `None` makes the workspace fetch fail.
    pub workspace: Option<Workspace>,
    /// `None` makes the server-config fetch fail.
    pub providers: Option<Vec<GitProvider>>,
    pub user_data: Option<GitUserData>,
    pub user_data_fails: bool,
}

#[async_trait]
impl ControlPlane for FakeControlPlane {
    async fn get_workspace(&self, workspace_id: &WorkspaceId) -> Result<Workspace, ClientError> {
        record(&self.log, Call::GetWorkspace(workspace_id.0.clone()));
        self.workspace.clone().ok_or_else(|| unavailable("workspace"))
    }

    async fn get_server_config(&self) -> Result<ServerConfig, ClientError> {
        record(&self.log, Call::GetServerConfig);
        self.providers
            .clone()
            .map(|git_providers| ServerConfig { git_providers })
            .ok_or_else(|| unavailable("server/config"))
    }

    async fn get_git_user_data(
        &self,
        provider_id: &ProviderId,
    ) -> Result<Option<GitUserData>, ClientError> {
        record(&self.log, Call::GetGitUserData(provider_id.0.clone()));
        if self.user_data_fails {
            return Err(ClientError::Status {
                url: "http://control-plane/gitprovider".to_string(),
                code: 500,
                body: "internal error".to_string(),
            });
        }
        Ok(self.user_data.clone())
    }
}

// ---------------------------------------------------------------------------
// Source control
// ---------------------------------------------------------------------------

pub struct FakeGit {
    log: CallLog,
    /// `None` makes the existence check fail.
    pub exists: Option<bool>,
    pub clone_fails: bool,
    pub config_fails: bool,
}

fn git_failure(command: &str) -> GitError {
    GitError::Command {
        command: command.to_string(),
        detail: "fatal: simulated".to_string(),
    }
}

#[async_trait]
impl SourceControl for FakeGit {
    async fn repository_exists(&self, _project: &Project) -> Result<bool, GitError> {
        record(&self.log, Call::RepositoryExists);
        self.exists.ok_or_else(|| git_failure("stat .git"))
    }

    async fn clone_repository(
        &self,
        _project: &Project,
        auth_token: Option<&str>,
    ) -> Result<(), GitError> {
        record(
            &self.log,
            Call::CloneRepository {
                token: auth_token.map(str::to_owned),
            },
        );
        if self.clone_fails {
            return Err(git_failure("git clone"));
        }
        Ok(())
    }

    async fn set_git_config(&self, user_data: Option<&GitUserData>) -> Result<(), GitError> {
        record(&self.log, Call::SetGitConfig(user_data.cloned()));
        if self.config_fails {
            return Err(git_failure("git config"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeed,
    Fail,
    /// Never returns.
    Hang,
}

pub struct FakeService {
    name: &'static str,
    call: Call,
    log: CallLog,
    outcome: Outcome,
    starts: AtomicUsize,
    started: Notify,
}

impl FakeService {
    fn new(name: &'static str, call: Call, log: CallLog, outcome: Outcome) -> Self {
        Self {
            name,
            call,
            log,
            outcome,
            starts: AtomicUsize::new(0),
            started: Notify::new(),
        }
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    /// Wait (bounded) until `start` has been entered at least once.
    pub async fn wait_started(&self) -> bool {
        if self.starts() > 0 {
            return true;
        }
        tokio::time::timeout(Duration::from_secs(2), self.started.notified())
            .await
            .is_ok()
    }
}

#[async_trait]
impl Service for FakeService {
    fn name(&self) -> &str {
        self.name
    }

    async fn start(&self) -> Result<(), ServiceError> {
        record(&self.log, self.call.clone());
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        match self.outcome {
            Outcome::Succeed => Ok(()),
            Outcome::Fail => Err(ServiceError::Exited {
                service: self.name.to_string(),
                status: "exit status: 1".to_string(),
            }),
            Outcome::Hang => {
                std::future::pending::<()>().await;
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// Knobs for one startup run. Defaults describe the baseline scenario:
/// workspace `ws1` with project `app` at [`REPO_URL`], no matching provider,
/// no local clone, every collaborator succeeding.
pub struct Scenario {
    pub workspace: Option<Workspace>,
    pub providers: Option<Vec<GitProvider>>,
    pub user_data: Option<GitUserData>,
    pub user_data_fails: bool,
    pub exists: Option<bool>,
    pub clone_fails: bool,
    pub config_fails: bool,
    pub shell: Outcome,
    pub mesh: Outcome,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            workspace: Some(workspace_with(vec![project("app", Some(REPO_URL))])),
            providers: Some(vec![provider("github", "gh-token")]),
            user_data: None,
            user_data_fails: false,
            exists: Some(false),
            clone_fails: false,
            config_fails: false,
            shell: Outcome::Succeed,
            mesh: Outcome::Succeed,
        }
    }
}

pub struct Harness {
    pub agent: Agent,
    pub log: CallLog,
    pub shell: Arc<FakeService>,
    pub mesh: Arc<FakeService>,
}

impl Harness {
    pub fn new(scenario: Scenario) -> Self {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let shell = Arc::new(FakeService::new(
            "ssh",
            Call::StartShell,
            log.clone(),
            scenario.shell,
        ));
        let mesh = Arc::new(FakeService::new(
            "mesh",
            Call::StartMesh,
            log.clone(),
            scenario.mesh,
        ));
        let collaborators = Collaborators {
            control_plane: Arc::new(FakeControlPlane {
                log: log.clone(),
                workspace: scenario.workspace,
                providers: scenario.providers,
                user_data: scenario.user_data,
                user_data_fails: scenario.user_data_fails,
            }),
            git: Arc::new(FakeGit {
                log: log.clone(),
                exists: scenario.exists,
                clone_fails: scenario.clone_fails,
                config_fails: scenario.config_fails,
            }),
            ssh: shell.clone(),
            mesh: mesh.clone(),
        };
        Self {
            agent: Agent::new(agent_config(), collaborators),
            log,
            shell,
            mesh,
        }
    }

    /// Calls made on the synchronous path, in order. The detached shell
    /// launch is excluded since its timing relative to the rest is unordered.
    pub fn sync_calls(&self) -> Vec<Call> {
        self.log
            .lock()
            .expect("call log")
            .iter()
            .filter(|c| **c != Call::StartShell)
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn agent_config() -> AgentConfig {
    AgentConfig {
        workspace_id: WorkspaceId::from("ws1"),
        project_name: ProjectName::from("app"),
        server_api_url: "http://control-plane:3986".to_string(),
        server_api_key: None,
        project_dir: PathBuf::from("/workspaces"),
        clone_path: None,
        ssh: default_ssh_command(),
        mesh: default_mesh_command(),
        log_format: LogFormat::Text,
    }
}

pub fn project(name: &str, url: Option<&str>) -> Project {
    Project {
        name: ProjectName::from(name),
        repository: Repository {
            url: url.map(str::to_owned),
            branch: None,
        },
    }
}

pub fn workspace_with(projects: Vec<Project>) -> Workspace {
    Workspace {
        id: WorkspaceId::from("ws1"),
        name: Some("dev".to_string()),
        projects,
    }
}

pub fn provider(id: &str, token: &str) -> GitProvider {
    GitProvider {
        id: ProviderId::from(id),
        username: None,
        token: Some(token.to_string()),
        base_api_url: None,
    }
}

pub fn user_data() -> GitUserData {
    GitUserData {
        name: Some("Ada Dev".to_string()),
        email: Some("ada@example.com".to_string()),
    }
}
