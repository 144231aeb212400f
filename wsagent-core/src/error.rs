//! Error types for wsagent-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while assembling an [`AgentConfig`](crate::AgentConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure reading the config file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load, with the file path for context.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A required setting was not supplied by any source.
    #[error("missing required setting `{field}` (set it in the config file or via ${env})")]
    MissingField {
        field: &'static str,
        env: &'static str,
    },

    /// `dirs::home_dir()` returned `None` and no project directory was given.
    #[error("cannot determine home directory; set project_dir explicitly")]
    HomeNotFound,
}
