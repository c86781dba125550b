//! Run configuration.
//!
//! Values are layered, lowest priority first: built-in defaults, an optional
//! TOML file, `TREEMIRROR_`-prefixed environment variables (nested keys
//! separated by `__`, e.g. `TREEMIRROR_REWRITE__TO`), then command-line
//! flags.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use treemirror_fetch::listing::html::{DEFAULT_MARKER_PREFIX, DEFAULT_SELECTOR};
use treemirror_fetch::{
    ConcurrencyGate, CrawlOptions, DEFAULT_BUDGET, DEFAULT_CHUNK_SIZE, Markers, PathRewrite,
    RemoteRef,
};
use treemirror_manifest::DEFAULT_MANIFEST_NAME;

use crate::error::ConfigError;
use crate::logging::LogConfig;

pub const ENV_PREFIX: &str = "TREEMIRROR_";

pub const DEFAULT_BASE_URL: &str = "https://gitea.radium.group";
pub const DEFAULT_PROJECT_PATH: &str = "/radium/project-configuration";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scheme and host every remote path is resolved against.
    pub base_url: String,
    /// Remote path of the root listing.
    pub project_path: String,
    /// Local directory the mirror root and the default manifest are placed in.
    pub dest_prefix: PathBuf,
    /// Upper bound on simultaneous network operations.
    pub concurrency: NonZeroUsize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_path: Option<PathBuf>,
    pub chunk_size: usize,
    /// Whole-run deadline; the run fails without a manifest once it passes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// CSS selector matching marker elements in a listing page.
    pub selector: String,
    pub marker_prefix: String,
    pub markers: Markers,
    pub rewrite: PathRewrite,
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            project_path: DEFAULT_PROJECT_PATH.to_string(),
            dest_prefix: PathBuf::new(),
            concurrency: DEFAULT_BUDGET,
            manifest_path: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            deadline_secs: None,
            user_agent: None,
            selector: DEFAULT_SELECTOR.to_string(),
            marker_prefix: DEFAULT_MARKER_PREFIX.to_string(),
            markers: Markers::default(),
            rewrite: PathRewrite::default(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Defaults, the optional file and the environment, without overrides.
    pub fn figment(file: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = file {
            if !path.is_file() {
                return Err(ConfigError::MissingFile(path.to_path_buf()));
            }
            figment = figment.merge(Toml::file(path));
        }
        // TREEMIRROR_LOG is an EnvFilter directive, not the `log` table.
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).ignore(&["log"]).split("__")))
    }

    /// Resolves every layer, with `overrides` applied last, and validates.
    pub fn load<T: Serialize>(file: Option<&Path>, overrides: &T) -> Result<Self, ConfigError> {
        let config: Config = Self::figment(file)?
            .merge(Serialized::defaults(overrides))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: &str| ConfigError::Invalid {
            field,
            reason: reason.to_string(),
        };

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(invalid("base_url", "must start with http:// or https://"));
        }
        if !self.project_path.starts_with('/') {
            return Err(invalid("project_path", "must start with '/'"));
        }
        self.root_name()?;
        if self.chunk_size == 0 {
            return Err(invalid("chunk_size", "must be greater than zero"));
        }
        if self.deadline_secs == Some(0) {
            return Err(invalid("deadline_secs", "must be greater than zero"));
        }
        if self.markers.directory.is_empty() || self.markers.file.is_empty() {
            return Err(invalid("markers", "marker values must not be empty"));
        }
        if self.markers.directory == self.markers.file {
            return Err(invalid("markers", "directory and file markers must differ"));
        }
        Ok(())
    }

    /// Last segment of the project path, used as the local root name.
    fn root_name(&self) -> Result<&str, ConfigError> {
        let last = self.project_path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
        treemirror_fs::entry_name(last).map_err(|e| ConfigError::Invalid {
            field: "project_path",
            reason: e.to_string(),
        })
    }

    pub fn root_ref(&self) -> RemoteRef {
        RemoteRef::new(self.base_url.trim_end_matches('/'), self.project_path.as_str())
    }

    /// `<dest_prefix>/<last segment of project_path>`.
    pub fn root_dir(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.dest_prefix.join(self.root_name()?))
    }

    /// The configured manifest path, or `<dest_prefix>/repository_sha256`.
    pub fn manifest_path(&self) -> PathBuf {
        self.manifest_path
            .clone()
            .unwrap_or_else(|| self.dest_prefix.join(DEFAULT_MANIFEST_NAME))
    }

    pub fn deadline(&self) -> Option<Duration> { self.deadline_secs.map(Duration::from_secs) }

    pub fn gate(&self) -> ConcurrencyGate { ConcurrencyGate::new(self.concurrency) }

    pub fn crawl_options(&self) -> CrawlOptions {
        CrawlOptions {
            markers: self.markers.clone(),
            rewrite: self.rewrite.clone(),
            chunk_size: self.chunk_size,
        }
    }
}
