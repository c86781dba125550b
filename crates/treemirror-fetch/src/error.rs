//! Error types for treemirror-fetch.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("connection to {url} failed: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("transfer from {url} interrupted: {reason}")]
    Interrupted { url: String, reason: String },

    #[error("unknown listing entry kind '{marker}'")]
    UnknownEntryKind { marker: String },

    #[error("listing entry '{marker}' has no adjacent reference")]
    MissingReference { marker: String },

    #[error("'{name}' cannot be used as a local file name")]
    InvalidName { name: String },

    #[error("invalid listing selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error(transparent)]
    Local(#[from] treemirror_fs::Error),

    #[error("crawl task failed: {0}")]
    TaskFailed(String),
}

impl FetchError {
    pub(crate) fn connection(url: &str, err: impl std::fmt::Display) -> Self {
        Self::ConnectionFailed {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn interrupted(url: &str, err: impl std::fmt::Display) -> Self {
        Self::Interrupted {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }

    /// Local environment failures end the crawl; everything else only costs
    /// the affected entry or subtree.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Local(_) | Self::TaskFailed(_))
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
