//! Recording test doubles for the pipeline's collaborators.
//!
//! The file system, mounter and opener doubles share a [`CallLog`] so tests can
//! assert on the order of operations across collaborators.

use async_trait::async_trait;
use reqwest::Url;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::core::{LauncherError, Result};
use crate::http::{HttpClient, HttpResponse, ProgressFn};
use crate::platform::{AppOpener, DiskImageMounter, FileSystem};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One recorded collaborator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// Operation name, e.g. `attach` or `copy_tree`
    pub kind: String,
    /// Primary path argument
    pub path: PathBuf,
}

/// Shared, ordered record of collaborator calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl CallLog {
    /// Record a call.
    pub fn record(&self, kind: &str, path: &Path) {
        lock(&self.calls).push(Call {
            kind: kind.to_string(),
            path: path.to_path_buf(),
        });
    }

    /// Every call so far.
    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    /// Operation names in call order.
    pub fn kinds(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.kind).collect()
    }

    /// Operation names in call order, restricted to `wanted`.
    pub fn kinds_of(&self, wanted: &[&str]) -> Vec<String> {
        self.kinds().into_iter().filter(|k| wanted.contains(&k.as_str())).collect()
    }

    /// How many times `kind` was called.
    pub fn count(&self, kind: &str) -> usize {
        lock(&self.calls).iter().filter(|c| c.kind == kind).count()
    }
}

fn injected(operation: &str, path: &Path) -> LauncherError {
    LauncherError::FileSystem {
        operation: operation.to_string(),
        path: path.display().to_string(),
        reason: "injected failure".to_string(),
    }
}

/// In-memory [`FileSystem`] that records every call.
///
/// Moves and tree copies succeed even when the source is unknown, so a file
/// written to disk by a real download or a tree inside a fake mount point can
/// flow through the installer.
#[derive(Debug, Default)]
pub struct RecordingFileSystem {
    log: CallLog,
    files: Mutex<BTreeMap<PathBuf, String>>,
    dirs: Mutex<BTreeSet<PathBuf>>,
    failing: Mutex<BTreeMap<String, usize>>,
    delays: Mutex<BTreeMap<String, Duration>>,
}

impl RecordingFileSystem {
    /// An empty file system recording into `log`.
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// Seed a file.
    pub fn add_file(&self, path: impl Into<PathBuf>) {
        lock(&self.files).insert(path.into(), String::new());
    }

    /// Seed a directory.
    pub fn add_dir(&self, path: impl Into<PathBuf>) {
        lock(&self.dirs).insert(path.into());
    }

    /// Make every later call of `kind` fail.
    pub fn fail_on(&self, kind: &str) {
        self.fail_after(kind, 0);
    }

    /// Let the first `allowed` calls of `kind` succeed and fail the rest.
    /// Calls already in the log count towards `allowed`.
    pub fn fail_after(&self, kind: &str, allowed: usize) {
        lock(&self.failing).insert(kind.to_string(), allowed);
    }

    /// Block every later call of `kind` for `delay` before it takes effect.
    pub fn delay_on(&self, kind: &str, delay: Duration) {
        lock(&self.delays).insert(kind.to_string(), delay);
    }

    /// Current content of a seeded or written file.
    pub fn content(&self, path: &Path) -> Option<String> {
        lock(&self.files).get(path).cloned()
    }

    fn enter(&self, kind: &str, path: &Path) -> Result<()> {
        let delay = lock(&self.delays).get(kind).copied();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        self.log.record(kind, path);
        let allowed = lock(&self.failing).get(kind).copied();
        match allowed {
            Some(allowed) if self.log.count(kind) > allowed => Err(injected(kind, path)),
            _ => Ok(()),
        }
    }
}

impl FileSystem for RecordingFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.log.record("exists", path);
        lock(&self.files).contains_key(path) || lock(&self.dirs).contains(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.enter("create_dir_all", path)?;
        lock(&self.dirs).insert(path.to_path_buf());
        Ok(())
    }

    fn copy_tree(&self, _from: &Path, to: &Path) -> Result<()> {
        self.enter("copy_tree", to)?;
        lock(&self.dirs).insert(to.to_path_buf());
        Ok(())
    }

    fn move_item(&self, from: &Path, to: &Path) -> Result<()> {
        self.enter("move", to)?;
        let content = lock(&self.files).remove(from).unwrap_or_default();
        lock(&self.files).insert(to.to_path_buf(), content);
        Ok(())
    }

    fn remove_if_exists(&self, path: &Path) -> Result<()> {
        self.enter("remove", path)?;
        lock(&self.files).retain(|p, _| !p.starts_with(path));
        lock(&self.dirs).retain(|p| !p.starts_with(path));
        Ok(())
    }

    fn write_string(&self, path: &Path, content: &str) -> Result<()> {
        self.enter("write", path)?;
        lock(&self.files).insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn read_string(&self, path: &Path) -> Result<Option<String>> {
        self.enter("read", path)?;
        Ok(lock(&self.files).get(path).cloned())
    }

    fn strip_quarantine(&self, path: &Path) -> Result<()> {
        self.enter("strip_quarantine", path)
    }
}

/// [`DiskImageMounter`] that only records.
#[derive(Debug, Default)]
pub struct MockMounter {
    log: CallLog,
    fail: bool,
}

impl MockMounter {
    /// A mounter recording into `log`.
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            fail: false,
        }
    }

    /// A mounter whose attach always fails.
    pub fn failing() -> Self {
        Self {
            log: CallLog::default(),
            fail: true,
        }
    }
}

impl DiskImageMounter for MockMounter {
    fn attach(&self, _image: &Path, mount_point: &Path) -> Result<()> {
        self.log.record("attach", mount_point);
        if self.fail {
            return Err(injected("hdiutil attach", mount_point));
        }
        Ok(())
    }

    fn detach(&self, mount_point: &Path) -> Result<()> {
        self.log.record("detach", mount_point);
        Ok(())
    }
}

/// [`AppOpener`] that records what it was asked to open.
#[derive(Debug, Default)]
pub struct MockOpener {
    log: CallLog,
    opened: Mutex<Vec<(PathBuf, Vec<String>)>>,
    fail: bool,
}

impl MockOpener {
    /// An opener recording into `log`.
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// An opener that always fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Every `(bundle, args)` pair opened so far.
    pub fn opened(&self) -> Vec<(PathBuf, Vec<String>)> {
        lock(&self.opened).clone()
    }
}

impl AppOpener for MockOpener {
    fn open(&self, bundle: &Path, args: &[String]) -> Result<()> {
        self.log.record("open", bundle);
        if self.fail {
            return Err(LauncherError::Launch {
                path: bundle.display().to_string(),
                reason: "injected failure".to_string(),
            });
        }
        lock(&self.opened).push((bundle.to_path_buf(), args.to_vec()));
        Ok(())
    }
}

/// [`HttpClient`] serving canned responses keyed by URL.
///
/// Unknown URLs fail with [`LauncherError::Transport`].
#[derive(Debug, Default)]
pub struct MockHttpClient {
    responses: HashMap<String, HttpResponse>,
    downloads: HashMap<String, Vec<u8>>,
    stalled: BTreeSet<String>,
    fetched: Mutex<Vec<String>>,
    downloaded: Mutex<Vec<String>>,
}

impl MockHttpClient {
    /// A client that knows no URLs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `response` for `fetch(url)`.
    #[must_use]
    pub fn with_response(mut self, url: &str, response: HttpResponse) -> Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    /// Serve `body` for `download(url, ..)`.
    #[must_use]
    pub fn with_download(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.downloads.insert(url.to_string(), body.into());
        self
    }

    /// Make `download(url, ..)` never complete.
    #[must_use]
    pub fn with_stalled_download(mut self, url: &str) -> Self {
        self.stalled.insert(url.to_string());
        self
    }

    /// URLs passed to `fetch`, in order.
    pub fn fetched(&self) -> Vec<String> {
        lock(&self.fetched).clone()
    }

    /// URLs passed to `download`, in order.
    pub fn downloaded(&self) -> Vec<String> {
        lock(&self.downloaded).clone()
    }
}

fn unknown(url: &Url) -> LauncherError {
    LauncherError::Transport {
        url: url.to_string(),
        reason: "no canned response".to_string(),
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn fetch(&self, url: &Url) -> Result<HttpResponse> {
        lock(&self.fetched).push(url.to_string());
        self.responses.get(url.as_str()).cloned().ok_or_else(|| unknown(url))
    }

    async fn download(
        &self,
        url: &Url,
        destination: &Path,
        progress: ProgressFn<'_>,
    ) -> Result<u64> {
        lock(&self.downloaded).push(url.to_string());

        if self.stalled.contains(url.as_str()) {
            std::future::pending::<()>().await;
        }

        let body = self.downloads.get(url.as_str()).ok_or_else(|| unknown(url))?;
        tokio::fs::write(destination, body)
            .await
            .map_err(|e| LauncherError::fs("write file", destination, e))?;

        let total = body.len() as u64;
        progress(total / 2, Some(total));
        progress(total, Some(total));
        Ok(total)
    }
}
