use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::logging::LogFormat;

#[derive(Clone, Debug, Parser)]
#[command(name = "treemirror", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    /// TOML configuration file
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub log: LogArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Mirror the remote tree and write its manifest (default)
    #[command(alias = "m", name = "mirror")]
    Mirror(MirrorArgs),
    /// Re-hash the files listed in a manifest
    #[command(alias = "v", name = "verify")]
    Verify(VerifyArgs),
    /// Print the resolved configuration as TOML
    #[command(alias = "cfg", name = "config")]
    Config(MirrorArgs),
}

/// Flags overriding configuration values. Unset flags leave lower layers alone.
#[derive(Clone, Debug, Default, Args, Serialize)]
pub struct MirrorArgs {
    /// Scheme and host of the remote, e.g. https://gitea.example.org
    #[arg(long, value_name = "URL")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Remote path of the root listing
    #[arg(long, value_name = "PATH")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_path: Option<String>,

    /// Local directory to mirror into
    #[arg(long, short = 'o', value_name = "DIR")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_prefix: Option<PathBuf>,

    /// Maximum simultaneous network operations
    #[arg(long, short = 'j', value_name = "N")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<NonZeroUsize>,

    /// Manifest output path
    #[arg(long, value_name = "PATH")]
    #[serde(rename = "manifest_path", skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,

    /// Download chunk size in bytes
    #[arg(long, value_name = "BYTES")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<usize>,

    /// Abort the whole run after this many seconds
    #[arg(long, value_name = "SECS")]
    #[serde(rename = "deadline_secs", skip_serializing_if = "Option::is_none")]
    pub deadline: Option<u64>,

    #[arg(long, value_name = "UA")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

#[derive(Clone, Debug, Default, Args)]
pub struct VerifyArgs {
    /// Manifest to check; defaults to the configured manifest path
    #[arg(long, value_name = "PATH")]
    pub manifest: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, Args, Serialize)]
pub struct LogArgs {
    /// Log filter directive, e.g. `debug` or `treemirror_fetch=trace`
    #[arg(long = "log-level", global = true, value_name = "FILTER")]
    #[serde(rename = "level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    #[arg(long = "log-format", global = true, value_enum)]
    #[serde(rename = "format", skip_serializing_if = "Option::is_none")]
    pub log_format: Option<LogFormat>,
}

/// The command-line layer of the configuration.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Overrides {
    #[serde(flatten)]
    pub mirror: MirrorArgs,
    pub log: LogArgs,
}

impl App {
    pub fn overrides(&self) -> Overrides {
        let mirror = match &self.command {
            Some(Commands::Mirror(args)) | Some(Commands::Config(args)) => args.clone(),
            Some(Commands::Verify(args)) => MirrorArgs {
                manifest: args.manifest.clone(),
                ..MirrorArgs::default()
            },
            None => MirrorArgs::default(),
        };
        Overrides {
            mirror,
            log: self.log.clone(),
        }
    }
}
