use std::path::PathBuf;
use std::time::Duration;

use treemirror_fetch::FetchError;
use treemirror_manifest::ManifestError;

/// Failure to resolve or apply the run configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Figment(#[from] figment::Error),

    #[error("configuration file '{0}' does not exist")]
    MissingFile(PathBuf),

    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("failed to install log subscriber: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),
}

/// Failure of a whole mirror run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("mirror did not finish within {0:?}")]
    DeadlineExceeded(Duration),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("manifest task failed: {0}")]
    TaskFailed(String),
}

pub type Result<T, E = RunError> = std::result::Result<T, E>;
