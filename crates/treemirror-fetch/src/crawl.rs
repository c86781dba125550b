use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::download::{DEFAULT_CHUNK_SIZE, Downloader};
use crate::error::{FetchError, Result};
use crate::gate::ConcurrencyGate;
use crate::http::{self, HttpClient};
use crate::listing::{EntryKind, ListingProvider, Markers};
use crate::remote::{PathRewrite, RemoteRef};

/// Knobs for a crawl. Defaults match a Gitea-style tree view.
#[derive(Clone, Debug)]
pub struct CrawlOptions {
    pub markers: Markers,
    pub rewrite: PathRewrite,
    pub chunk_size: usize,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            markers: Markers::default(),
            rewrite: PathRewrite::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Something the crawl gave up on. Nothing was written locally for it.
#[derive(Debug)]
pub struct SkippedEntry {
    /// The URL, or the listing it appeared in when it had no usable reference.
    pub target: String,
    pub error: FetchError,
}

/// Summary of a completed crawl.
#[derive(Debug, Default)]
pub struct CrawlReport {
    pub directories: usize,
    pub files: usize,
    pub bytes: u64,
    pub skipped: Vec<SkippedEntry>,
}

impl CrawlReport {
    pub fn is_complete(&self) -> bool { self.skipped.is_empty() }
}

enum Job {
    Listing { remote: RemoteRef, local: PathBuf },
    Download { remote: RemoteRef, local: PathBuf },
}

enum Outcome {
    Listed {
        children: Vec<Job>,
        skipped: Vec<SkippedEntry>,
    },
    Downloaded {
        bytes: u64,
    },
    Skipped(SkippedEntry),
}

/// Mirrors a remote directory tree onto the local filesystem.
///
/// Every listing fetch and every download runs as its own task and takes a
/// slot from the shared [`ConcurrencyGate`] only while its request is in
/// flight, so fan-out is unbounded while network concurrency is not.
pub struct TreeFetcher<C, P> {
    client: Arc<C>,
    provider: Arc<P>,
    downloader: Downloader<C>,
    options: Arc<CrawlOptions>,
}

impl<C, P> Clone for TreeFetcher<C, P> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            provider: Arc::clone(&self.provider),
            downloader: self.downloader.clone(),
            options: Arc::clone(&self.options),
        }
    }
}

impl<C: HttpClient, P: ListingProvider> TreeFetcher<C, P> {
    pub fn new(client: Arc<C>, provider: P, gate: ConcurrencyGate) -> Self {
        Self::with_options(client, provider, gate, CrawlOptions::default())
    }

    pub fn with_options(
        client: Arc<C>,
        provider: P,
        gate: ConcurrencyGate,
        options: CrawlOptions,
    ) -> Self {
        let downloader = Downloader::new(Arc::clone(&client), gate).chunk_size(options.chunk_size);
        Self {
            client,
            provider: Arc::new(provider),
            downloader,
            options: Arc::new(options),
        }
    }

    pub fn gate(&self) -> &ConcurrencyGate { self.downloader.gate() }

    /// Mirror the listing at `root` into `local`.
    ///
    /// Returns once every transitively discovered listing and download has
    /// finished. Network failures are logged and recorded in the report;
    /// the first local filesystem failure aborts all outstanding work and is
    /// returned. Dropping the returned future cancels the whole crawl.
    pub async fn crawl(&self, root: RemoteRef, local: impl Into<PathBuf>) -> Result<CrawlReport> {
        let local = local.into();
        treemirror_fs::ensure_dir(&local).await?;

        let mut tasks = JoinSet::new();
        let mut report = CrawlReport::default();
        self.spawn(&mut tasks, Job::Listing { remote: root, local });

        while let Some(joined) = tasks.join_next().await {
            let outcome = joined.map_err(|e| FetchError::TaskFailed(e.to_string()))??;
            match outcome {
                Outcome::Listed { children, skipped } => {
                    report.directories += 1;
                    report.skipped.extend(skipped);
                    for job in children {
                        self.spawn(&mut tasks, job);
                    }
                }
                Outcome::Downloaded { bytes } => {
                    report.files += 1;
                    report.bytes += bytes;
                }
                Outcome::Skipped(entry) => report.skipped.push(entry),
            }
        }

        info!(
            directories = report.directories,
            files = report.files,
            bytes = report.bytes,
            skipped = report.skipped.len(),
            "crawl finished"
        );
        Ok(report)
    }

    fn spawn(&self, tasks: &mut JoinSet<Result<Outcome>>, job: Job) {
        let this = self.clone();
        tasks.spawn(async move { this.run(job).await });
    }

    async fn run(&self, job: Job) -> Result<Outcome> {
        match job {
            Job::Listing { remote, local } => self.list(remote, local).await,
            Job::Download { remote, local } => self.download(remote, local).await,
        }
    }

    async fn fetch_listing(&self, remote: &RemoteRef) -> Result<String> {
        // The slot covers the request and reading its body, nothing after.
        let _permit = self.gate().acquire().await;
        http::read_text(self.client.as_ref(), &remote.url()).await
    }

    async fn list(&self, remote: RemoteRef, local: PathBuf) -> Result<Outcome> {
        let document = match self.fetch_listing(&remote).await {
            Ok(document) => document,
            Err(e) if !e.is_fatal() => {
                error!(url = %remote, error = %e, "failed to fetch listing");
                return Ok(Outcome::Skipped(SkippedEntry {
                    target: remote.url(),
                    error: e,
                }));
            }
            Err(e) => return Err(e),
        };

        let entries = self.provider.parse(&document);
        let mut children = Vec::with_capacity(entries.len());
        let mut skipped = Vec::new();

        for marked in entries {
            let entry = match self.options.markers.classify(&remote, marked) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(listing = %remote, error = %e, "skipping listing entry");
                    skipped.push(SkippedEntry {
                        target: remote.url(),
                        error: e,
                    });
                    continue;
                }
            };

            let reference = match entry.kind {
                EntryKind::File => self.options.rewrite.apply(&entry.reference),
                EntryKind::Directory => entry.reference,
            };

            let name = match treemirror_fs::entry_name(reference.name()) {
                Ok(name) => name.to_string(),
                Err(_) => {
                    let e = FetchError::InvalidName {
                        name: reference.name().to_string(),
                    };
                    warn!(url = %reference, error = %e, "skipping listing entry");
                    skipped.push(SkippedEntry {
                        target: reference.url(),
                        error: e,
                    });
                    continue;
                }
            };

            let child = local.join(name);
            debug!(url = %reference, path = %child.display(), kind = ?entry.kind, "discovered entry");

            match entry.kind {
                EntryKind::File => children.push(Job::Download {
                    remote: reference,
                    local: child,
                }),
                EntryKind::Directory => {
                    treemirror_fs::ensure_dir(&child).await?;
                    children.push(Job::Listing {
                        remote: reference,
                        local: child,
                    });
                }
            }
        }

        info!(url = %remote, entries = children.len(), skipped = skipped.len(), "listed directory");
        Ok(Outcome::Listed { children, skipped })
    }

    async fn download(&self, remote: RemoteRef, local: PathBuf) -> Result<Outcome> {
        match self.downloader.fetch(&remote, &local).await {
            Ok(bytes) => Ok(Outcome::Downloaded { bytes }),
            Err(e) if !e.is_fatal() => {
                error!(url = %remote, error = %e, "failed to download file");
                Ok(Outcome::Skipped(SkippedEntry {
                    target: remote.url(),
                    error: e,
                }))
            }
            Err(e) => Err(e),
        }
    }
}
