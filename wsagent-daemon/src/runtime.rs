use std::future::Future;
use std::io;

use wsagent_core::{AgentConfig, LogFormat};

use crate::agent::{Agent, Collaborators};
use crate::error::AgentError;

/// Start the agent and block the current thread until it exits.
pub fn start_blocking(config: AgentConfig) -> Result<(), AgentError> {
    init_tracing(config.log_format);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| AgentError::Runtime(format!("failed to build tokio runtime: {e}")))?;
    runtime.block_on(run(config))
}

/// Run the agent with production collaborators until the mesh service stops
/// or ctrl-c arrives.
pub async fn run(config: AgentConfig) -> Result<(), AgentError> {
    let collaborators = Collaborators::from_config(&config)?;
    run_with(Agent::new(config, collaborators)).await
}

/// Run a prepared agent, racing its startup sequence against ctrl-c.
pub async fn run_with(agent: Agent) -> Result<(), AgentError> {
    run_until(agent.start(), tokio::signal::ctrl_c()).await
}

/// Drive `start` until it finishes or `shutdown` fires. A shutdown source that
/// fails is logged and `start` keeps running.
async fn run_until<S, C>(start: S, shutdown: C) -> Result<(), AgentError>
where
    S: Future<Output = Result<(), AgentError>>,
    C: Future<Output = io::Result<()>>,
{
    tokio::pin!(start);
    let result = tokio::select! {
        result = &mut start => result,
        signal = shutdown => match signal {
            Ok(()) => {
                tracing::info!("received ctrl-c, shutting down agent");
                return Ok(());
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to listen for ctrl-c; continuing without it");
                start.await
            }
        },
    };

    if let Err(err) = &result {
        tracing::error!(error = %err, "agent startup failed");
    }
    result
}

fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = match format {
        LogFormat::Text => fmt().with_env_filter(filter).with_target(false).try_init(),
        LogFormat::Json => fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .try_init(),
    };
}
