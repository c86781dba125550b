//! Orchestration of a mirror run: crawl, wait for the whole tree, then hash.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use treemirror_fetch::{CrawlReport, HtmlListing, HttpClient, ListingProvider, ReqwestClient, TreeFetcher};
use treemirror_manifest::{CheckReport, ManifestBuilder, ManifestError};

use crate::config::Config;
use crate::error::{Result, RunError};

#[derive(Debug)]
pub struct RunSummary {
    pub root: PathBuf,
    pub manifest: PathBuf,
    pub crawl: CrawlReport,
    /// Number of files listed in the manifest.
    pub records: usize,
}

/// Mirrors the configured remote over HTTP using the HTML listing provider.
pub async fn run(config: &Config) -> Result<RunSummary> {
    let client = match &config.user_agent {
        Some(agent) => ReqwestClient::with_user_agent(agent),
        None => ReqwestClient::new(),
    }
    .map_err(|e| RunError::Client(e.to_string()))?;
    let provider = HtmlListing::with_selector(&config.selector, config.marker_prefix.as_str())?;

    run_with(Arc::new(client), provider, config).await
}

/// Mirrors the configured remote with the given client and provider.
///
/// The manifest is built only after every listing and download spawned by
/// the crawl has finished. If the deadline passes first, all outstanding
/// work is cancelled and no manifest is written.
pub async fn run_with<C, P>(client: Arc<C>, provider: P, config: &Config) -> Result<RunSummary>
where
    C: HttpClient,
    P: ListingProvider,
{
    let root = config.root_dir()?;
    let manifest = config.manifest_path();
    let remote = config.root_ref();

    tracing::info!(
        remote = %remote,
        root = %root.display(),
        concurrency = config.concurrency.get(),
        "starting mirror"
    );

    let fetcher = TreeFetcher::with_options(client, provider, config.gate(), config.crawl_options());
    let crawl = fetcher.crawl(remote, root.clone());
    let report = match config.deadline() {
        Some(limit) => tokio::time::timeout(limit, crawl)
            .await
            .map_err(|_| RunError::DeadlineExceeded(limit))??,
        None => crawl.await?,
    };

    if !report.is_complete() {
        tracing::warn!(skipped = report.skipped.len(), "mirror is incomplete");
    }

    let builder = ManifestBuilder::new(&root);
    let output = manifest.clone();
    let records = tokio::task::spawn_blocking(move || builder.build(&output))
        .await
        .map_err(|e| RunError::TaskFailed(e.to_string()))??;

    Ok(RunSummary {
        root,
        manifest,
        crawl: report,
        records: records.len(),
    })
}

/// Reads the manifest at `path` and re-hashes every file it lists.
pub fn verify(path: &Path) -> std::result::Result<CheckReport, ManifestError> {
    let records = treemirror_manifest::read_manifest(path)?;
    let report = treemirror_manifest::check(&records)?;
    tracing::info!(
        manifest = %path.display(),
        checked = report.checked,
        mismatched = report.mismatched.len(),
        missing = report.missing.len(),
        "verified manifest"
    );
    Ok(report)
}
