//! wsagent core library — domain types, configuration, provider matching.
//!
//! - [`types`] — newtypes, control-plane payloads, [`AgentConfig`]
//! - [`config`] — layered config loading
//! - [`gitprovider`] — repository URL → git provider matching
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod error;
pub mod gitprovider;
pub mod types;

pub use error::ConfigError;
pub use types::{
    AgentConfig, GitProvider, GitUserData, LogFormat, Project, ProjectName, ProviderId,
    Repository, ServerConfig, ServiceCommand, Workspace, WorkspaceId,
};
