//! Workspace agent runtime: startup sequencing over injected collaborators.

mod agent;
pub mod control_plane;
mod error;
pub mod git;
pub mod resolve;
mod runtime;
pub mod service;

pub use agent::{Agent, Collaborators};
pub use control_plane::{ApiClient, ControlPlane};
pub use error::{AgentError, ClientError, GitError, ServiceError};
pub use git::{GitCli, SourceControl};
pub use resolve::{GitIdentityResolver, ProjectResolver};
pub use runtime::{run, run_with, start_blocking};
pub use service::{ProcessService, Service};
