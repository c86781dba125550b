use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use tempfile::tempdir;
use treemirror::{Config, RunError, run_with, verify};
use treemirror_fetch::{BoxStream, HttpClient, ListingProvider, MarkedEntry};
use treemirror_manifest::read_manifest;

const BASE: &str = "http://mirror.test";
const DIR: &str = "octicon-file-directory-fill";
const FILE: &str = "octicon-file";

#[derive(Debug)]
struct Unreachable(String);

impl fmt::Display for Unreachable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "cannot connect to {}", self.0) }
}

impl std::error::Error for Unreachable {}

#[derive(Default)]
struct Remote {
    bodies: HashMap<String, Vec<u8>>,
    latency: Duration,
    /// File downloads deliver their first chunk and then hang.
    stall: bool,
}

impl Remote {
    fn page(mut self, path: &str, entries: &[(&str, &str)]) -> Self {
        let body = entries
            .iter()
            .map(|(marker, href)| format!("{marker} {href}\n"))
            .collect::<String>();
        self.bodies.insert(format!("{BASE}{path}"), body.into_bytes());
        self
    }

    fn file(mut self, path: &str, content: &str) -> Self {
        self.bodies.insert(format!("{BASE}{path}"), content.as_bytes().to_vec());
        self
    }
}

impl HttpClient for Remote {
    type Error = Unreachable;

    async fn stream(
        &self,
        url: &str,
    ) -> Result<BoxStream<'static, Result<Bytes, Unreachable>>, Unreachable> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let body = self
            .bodies
            .get(url)
            .cloned()
            .ok_or_else(|| Unreachable(url.to_string()))?;
        let chunks: Vec<Result<Bytes, Unreachable>> =
            body.chunks(4).map(|c| Ok(Bytes::copy_from_slice(c))).collect();
        if self.stall && url.contains("/raw/") {
            let first = chunks.into_iter().take(1);
            return Ok(Box::pin(
                futures_util::stream::iter(first).chain(futures_util::stream::pending()),
            ));
        }
        Ok(Box::pin(futures_util::stream::iter(chunks)))
    }
}

struct Lines;

impl ListingProvider for Lines {
    fn parse(&self, document: &str) -> Vec<MarkedEntry> {
        document
            .lines()
            .filter_map(|line| line.split_once(' '))
            .map(|(marker, href)| MarkedEntry::new(marker, href))
            .collect()
    }
}

fn sample_remote() -> Remote {
    Remote::default()
        .page(
            "/org/repo",
            &[
                (FILE, "/org/repo/src/branch/master/README.md"),
                (DIR, "/org/repo/src/branch/master/docs"),
            ],
        )
        .page(
            "/org/repo/src/branch/master/docs",
            &[
                (FILE, "/org/repo/src/branch/master/docs/guide.txt"),
                (FILE, "/org/repo/src/branch/master/docs/lost.txt"),
            ],
        )
        .file("/org/repo/raw/branch/master/README.md", "abc")
        .file("/org/repo/raw/branch/master/docs/guide.txt", "hello world")
}

fn config_for(prefix: &Path) -> Config {
    Config {
        base_url: BASE.to_string(),
        project_path: "/org/repo".to_string(),
        dest_prefix: prefix.to_path_buf(),
        ..Config::default()
    }
}

#[tokio::test]
async fn test_mirror_then_manifest() {
    let out = tempdir().unwrap();
    let config = config_for(out.path());

    let summary = run_with(Arc::new(sample_remote()), Lines, &config).await.unwrap();

    let root = out.path().join("repo");
    assert_eq!(summary.root, root);
    assert_eq!(summary.manifest, out.path().join("repository_sha256"));
    assert_eq!(summary.crawl.files, 2);
    assert_eq!(summary.crawl.directories, 2);
    assert_eq!(summary.crawl.skipped.len(), 1);
    assert_eq!(summary.records, 2);

    assert_eq!(std::fs::read_to_string(root.join("README.md")).unwrap(), "abc");
    assert_eq!(std::fs::read_to_string(root.join("docs/guide.txt")).unwrap(), "hello world");
    assert!(!root.join("docs/lost.txt").exists());

    let records = read_manifest(&summary.manifest).unwrap();
    let rows: Vec<(std::path::PathBuf, &str)> = records
        .iter()
        .map(|r| (r.file_path.clone(), r.content_hash.as_str()))
        .collect();
    assert_eq!(
        rows,
        vec![
            (
                root.join("README.md"),
                "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
            ),
            (
                root.join("docs").join("guide.txt"),
                "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
            ),
        ]
    );

    let report = verify(&summary.manifest).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.checked, 2);
}

#[tokio::test]
async fn test_rerun_rewrites_identical_manifest() {
    let out = tempdir().unwrap();
    let config = config_for(out.path());
    let client = Arc::new(sample_remote());

    let first = run_with(Arc::clone(&client), Lines, &config).await.unwrap();
    let before = std::fs::read(&first.manifest).unwrap();
    let second = run_with(client, Lines, &config).await.unwrap();
    let after = std::fs::read(&second.manifest).unwrap();

    assert_eq!(before, after);
}

#[tokio::test]
async fn test_custom_manifest_path_inside_root() {
    let out = tempdir().unwrap();
    let manifest = out.path().join("repo").join("SHA256SUMS");
    let config = Config {
        manifest_path: Some(manifest.clone()),
        ..config_for(out.path())
    };

    let summary = run_with(Arc::new(sample_remote()), Lines, &config).await.unwrap();

    assert_eq!(summary.manifest, manifest);
    let records = read_manifest(&manifest).unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.file_path != manifest));
}

#[tokio::test]
async fn test_unreachable_root_still_writes_manifest() {
    let out = tempdir().unwrap();
    let config = config_for(out.path());

    let summary = run_with(Arc::new(Remote::default()), Lines, &config).await.unwrap();

    assert_eq!(summary.crawl.files, 0);
    assert_eq!(summary.crawl.directories, 0);
    assert_eq!(summary.crawl.skipped.len(), 1);
    assert_eq!(summary.records, 0);
    assert!(out.path().join("repo").is_dir());
    assert_eq!(
        std::fs::read_to_string(&summary.manifest).unwrap(),
        "file_path,sha256_hash\n"
    );
}

#[tokio::test]
async fn test_deadline_cancels_without_manifest() {
    let out = tempdir().unwrap();
    let config = Config {
        deadline_secs: Some(1),
        ..config_for(out.path())
    };
    let remote = Remote {
        latency: Duration::from_secs(30),
        ..sample_remote()
    };

    let err = run_with(Arc::new(remote), Lines, &config).await.unwrap_err();

    assert!(matches!(err, RunError::DeadlineExceeded(limit) if limit == Duration::from_secs(1)));
    assert!(!out.path().join("repository_sha256").exists());
}

#[tokio::test]
async fn test_deadline_leaves_no_partial_files() {
    let out = tempdir().unwrap();
    let config = Config {
        deadline_secs: Some(1),
        ..config_for(out.path())
    };
    let remote = Remote {
        stall: true,
        ..sample_remote()
    };

    let err = run_with(Arc::new(remote), Lines, &config).await.unwrap_err();
    assert!(matches!(err, RunError::DeadlineExceeded(_)));

    // Aborted downloads drop their staged files once the runtime gets to them.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let leftovers: Vec<_> = walkdir::WalkDir::new(out.path())
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| {
            let name = e.file_name().to_string_lossy();
            name.starts_with(".treemirror.") || name.ends_with(".part")
        })
        .map(|e| e.into_path())
        .collect();
    assert!(leftovers.is_empty(), "{leftovers:?}");
    assert!(!out.path().join("repo/README.md").exists());
    assert!(!out.path().join("repository_sha256").exists());
}

#[tokio::test]
async fn test_invalid_project_path_fails_before_network() {
    let out = tempdir().unwrap();
    let config = Config {
        project_path: "/".to_string(),
        ..config_for(out.path())
    };

    let err = run_with(Arc::new(sample_remote()), Lines, &config).await.unwrap_err();
    assert!(matches!(err, RunError::Config(_)));
}
