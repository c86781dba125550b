#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use treemirror_fetch::{BoxStream, HttpClient, ListingProvider, MarkedEntry, RemoteRef};

pub const BASE: &str = "http://mirror.test";
pub const ROOT: &str = "/org/repo/src/branch/master";
pub const DIR: &str = "octicon-file-directory-fill";
pub const FILE: &str = "octicon-file";

pub fn root() -> RemoteRef { RemoteRef::new(BASE, ROOT) }

/// View path of an entry below the root, as it appears in a listing.
pub fn view(rel: &str) -> String { format!("{ROOT}/{rel}") }

/// Raw path a file entry is downloaded from.
pub fn raw(rel: &str) -> String { format!("/org/repo/raw/branch/master/{rel}") }

#[derive(Debug)]
pub struct MockError(pub String);

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl std::error::Error for MockError {}

enum Resource {
    Page(String),
    File(Vec<u8>),
    Broken(Vec<u8>),
}

/// In-memory remote tree. Unregistered URLs behave as unreachable hosts.
pub struct MockClient {
    resources: HashMap<String, Resource>,
    latency: Duration,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    requests: Mutex<Vec<String>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            resources: HashMap::new(),
            latency: Duration::ZERO,
            in_flight: Arc::default(),
            peak: Arc::default(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Registers a listing page at `path`; each entry is `(marker, href)`.
    pub fn page<S: AsRef<str>>(mut self, path: &str, entries: &[(&str, S)]) -> Self {
        let body = entries
            .iter()
            .map(|(marker, href)| format!("{marker} {}", href.as_ref()))
            .collect::<Vec<_>>()
            .join("\n");
        self.resources.insert(format!("{BASE}{path}"), Resource::Page(body));
        self
    }

    pub fn raw_page(mut self, path: &str, body: &str) -> Self {
        self.resources
            .insert(format!("{BASE}{path}"), Resource::Page(body.to_string()));
        self
    }

    pub fn file(mut self, path: &str, content: &[u8]) -> Self {
        self.resources
            .insert(format!("{BASE}{path}"), Resource::File(content.to_vec()));
        self
    }

    /// A file whose body stream fails after yielding `content`.
    pub fn broken_file(mut self, path: &str, content: &[u8]) -> Self {
        self.resources
            .insert(format!("{BASE}{path}"), Resource::Broken(content.to_vec()));
        self
    }

    /// Highest number of requests observed in flight at once.
    pub fn peak(&self) -> usize { self.peak.load(Ordering::SeqCst) }

    pub fn requests(&self) -> Vec<String> { self.requests.lock().unwrap().clone() }
}

struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: &Arc<AtomicUsize>, peak: &AtomicUsize) -> Self {
        let now = counter.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) { self.0.fetch_sub(1, Ordering::SeqCst); }
}

fn body(
    data: &[u8],
    fail: bool,
    guard: InFlight,
) -> BoxStream<'static, Result<Bytes, MockError>> {
    let mut items: Vec<Result<Bytes, MockError>> = data
        .chunks(7)
        .map(|c| Ok(Bytes::copy_from_slice(c)))
        .collect();
    if fail {
        items.push(Err(MockError("connection reset by peer".to_string())));
    }
    Box::pin(futures_util::stream::iter(items).map(move |item| {
        let _held = &guard;
        item
    }))
}

impl HttpClient for MockClient {
    type Error = MockError;

    async fn stream(
        &self,
        url: &str,
    ) -> Result<BoxStream<'static, Result<Bytes, MockError>>, MockError> {
        self.requests.lock().unwrap().push(url.to_string());
        let guard = InFlight::enter(&self.in_flight, &self.peak);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match self.resources.get(url) {
            None => Err(MockError(format!("cannot connect to {url}"))),
            Some(Resource::Page(text)) => Ok(body(text.as_bytes(), false, guard)),
            Some(Resource::File(data)) => Ok(body(data, false, guard)),
            Some(Resource::Broken(data)) => Ok(body(data, true, guard)),
        }
    }
}

/// Listing provider for the mock pages: one `marker [href]` per line.
pub struct LineListing;

impl ListingProvider for LineListing {
    fn parse(&self, document: &str) -> Vec<MarkedEntry> {
        document
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                let mut parts = line.split_whitespace();
                MarkedEntry {
                    marker: parts.next().unwrap_or_default().to_string(),
                    reference: parts.next().map(str::to_string),
                }
            })
            .collect()
    }
}

/// Every path below `root`, relative and `/`-separated, directories included.
pub fn tree(root: &Path) -> BTreeSet<String> {
    fn walk(root: &Path, dir: &Path, out: &mut BTreeSet<String>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            let rel = path.strip_prefix(root).unwrap();
            out.insert(
                rel.components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/"),
            );
            if path.is_dir() {
                walk(root, &path, out);
            }
        }
    }

    let mut out = BTreeSet::new();
    walk(root, root, &mut out);
    out
}

pub fn set(items: &[&str]) -> BTreeSet<String> { items.iter().map(|s| s.to_string()).collect() }
