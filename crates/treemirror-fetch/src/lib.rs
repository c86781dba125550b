//! Bounded-concurrency mirroring of a remote directory listing.
//!
//! # Architecture
//!
//! - [`remote`] - remote locators and the view-to-raw path rewrite
//! - [`gate`] - admission control shared by every network operation
//! - [`http`] - the HTTP client seam and its `reqwest` implementation
//! - [`download`] - streaming a single file onto disk
//! - [`listing`] - listing entries, classification and providers
//! - [`crawl`] - the traversal tying the above together
//!
//! Network failures are recovered where they happen and recorded in the
//! [`CrawlReport`]; local filesystem failures abort the crawl.

pub mod crawl;
pub mod download;
pub mod gate;
pub mod http;
pub mod listing;
pub mod remote;

mod error;

pub use crawl::{CrawlOptions, CrawlReport, SkippedEntry, TreeFetcher};
pub use download::{DEFAULT_CHUNK_SIZE, Downloader};
pub use error::{FetchError, Result};
pub use gate::{ConcurrencyGate, DEFAULT_BUDGET, GatePermit};
pub use http::{BoxStream, HttpClient};
pub use listing::{EntryKind, ListingEntry, ListingProvider, MarkedEntry, Markers};
pub use remote::{PathRewrite, RemoteRef};

#[cfg(feature = "html")]
pub use listing::html::HtmlListing;

#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
