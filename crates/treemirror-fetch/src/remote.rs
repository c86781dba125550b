use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Locator of a remote directory listing or file.
///
/// The fetch address is always `base` followed by `path`, concatenated
/// verbatim. Children discovered in a listing share their parent's base.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RemoteRef {
    base: Arc<str>,
    path: String,
}

impl RemoteRef {
    pub fn new(base: impl Into<Arc<str>>, path: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            path: path.into(),
        }
    }

    pub fn base(&self) -> &str { &self.base }

    pub fn path(&self) -> &str { &self.path }

    pub fn url(&self) -> String { format!("{}{}", self.base, self.path) }

    /// A sibling reference on the same base.
    pub fn with_path(&self, path: impl Into<String>) -> Self {
        Self {
            base: Arc::clone(&self.base),
            path: path.into(),
        }
    }

    /// Last `/`-separated segment of the path, possibly empty.
    pub fn name(&self) -> &str {
        match self.path.rsplit_once('/') {
            Some((_, last)) => last,
            None => &self.path,
        }
    }
}

impl fmt::Display for RemoteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.base, self.path)
    }
}

/// Substring substitution turning a "view" file path into its raw-content
/// equivalent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathRewrite {
    pub from: String,
    pub to: String,
}

impl Default for PathRewrite {
    fn default() -> Self {
        Self {
            from: "/src/branch".to_string(),
            to: "/raw/branch".to_string(),
        }
    }
}

impl PathRewrite {
    pub fn apply(&self, remote: &RemoteRef) -> RemoteRef {
        if self.from.is_empty() {
            return remote.clone();
        }
        remote.with_path(remote.path().replace(&self.from, &self.to))
    }
}
