//! Mirror a remote repository tree onto the local filesystem and record a
//! SHA-256 manifest of everything that arrived.
//!
//! The binary wires [`config::Config`] (figment layers plus CLI flags),
//! [`logging`] and [`run::run`] together; [`run::run_with`] takes any
//! [`treemirror_fetch::HttpClient`] and [`treemirror_fetch::ListingProvider`].

pub mod cli;
pub mod config;
pub mod logging;
pub mod run;

mod error;

pub use config::Config;
pub use error::{ConfigError, Result, RunError};
pub use run::{RunSummary, run, run_with, verify};
