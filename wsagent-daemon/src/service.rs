//! Long-running connectivity services (remote shell, mesh network).

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use wsagent_core::ServiceCommand;

use crate::error::ServiceError;

/// A service that runs until it exits or fails.
#[async_trait]
pub trait Service: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Run the service. Resolves only when it stops.
    async fn start(&self) -> Result<(), ServiceError>;
}

/// [`Service`] that supervises a single child process.
///
/// stdout/stderr are inherited so the service's own logs land next to ours.
/// The child is killed if the `start` future is dropped.
#[derive(Debug, Clone)]
pub struct ProcessService {
    name: String,
    command: ServiceCommand,
}

impl ProcessService {
    pub fn new(name: impl Into<String>, command: ServiceCommand) -> Self {
        Self {
            name: name.into(),
            command,
        }
    }
}

#[async_trait]
impl Service for ProcessService {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> Result<(), ServiceError> {
        tracing::info!(service = %self.name, command = %self.command, "launching service");

        let mut child = Command::new(&self.command.program)
            .args(&self.command.args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ServiceError::Spawn {
                service: self.name.clone(),
                program: self.command.program.clone(),
                source,
            })?;

        let status = child.wait().await.map_err(|source| ServiceError::Spawn {
            service: self.name.clone(),
            program: self.command.program.clone(),
            source,
        })?;

        if status.success() {
            tracing::info!(service = %self.name, "service exited");
            return Ok(());
        }

        Err(ServiceError::Exited {
            service: self.name.clone(),
            status: status.to_string(),
        })
    }
}
