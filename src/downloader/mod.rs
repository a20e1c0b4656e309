//! The end-to-end update flow.
//!
//! [`Downloader::download`] is a single linear chain of suspend points. It is
//! driven once per process:
//!
//! ```text
//! Idle -> ResolvingUpdate -+-> LaunchingExisting --------------------------+-> Terminated
//!                          +-> Downloading -> Installing -> LaunchingNew --+
//! ```
//!
//! Every stage reports a status message before it starts. Any error ends the
//! run; nothing is retried. One [`CancellationToken`] covers the whole chain:
//! cancelling it abandons the current suspend point and yields
//! [`LauncherError::Cancelled`]. Install steps run on the blocking pool and
//! cannot be interrupted, so cancellation waits for the running step to end.
//! The installer sees the same token and stops before its next step. Only
//! then is the mounted disk image, if any, detached. After `download` returns
//! nothing is attached and no further install step runs.
//!
//! # Examples
//!
//! ```rust,no_run
//! use tokio_util::sync::CancellationToken;
//! use tor_browser_launcher::config::{LauncherPaths, Settings};
//! use tor_browser_launcher::downloader::{Collaborators, Downloader};
//! use tor_browser_launcher::resolver::parse_url;
//! use tor_browser_launcher::status::StatusSender;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let paths = LauncherPaths::from_environment()?;
//! let settings = Settings::default();
//! let collaborators = Collaborators::system(settings.effective_proxy())?;
//! let downloader = Downloader::new(
//!     paths,
//!     parse_url(settings.mirror())?,
//!     collaborators,
//!     StatusSender::disconnected(),
//! )?;
//! downloader.download(&CancellationToken::new()).await?;
//! # Ok(())
//! # }
//! ```

use reqwest::Url;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::LauncherPaths;
use crate::constants::{BACKGROUND_IDENTIFIER, DEFAULT_UPDATE_URL_PREFIX, LAUNCH_QUIT_DELAY};
use crate::core::{LauncherError, Result};
use crate::http::{HttpClient, ReqwestClient};
use crate::installer::{ArchiveInstaller, DiskImageManager, launch_and_quit};
use crate::platform::{AppOpener, DiskImageMounter, FileSystem, Hdiutil, StdFileSystem, SystemOpener};
use crate::resolver::{UpdateResolver, update_index_url};
use crate::status::StatusSender;
use crate::version::VersionStore;

/// Where the flow currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not started
    Idle,
    /// Fetching the index and the release manifest
    ResolvingUpdate,
    /// The resolved build is installed and is being opened
    LaunchingExisting,
    /// Transferring the disk image
    Downloading,
    /// Replacing the installed bundle
    Installing,
    /// Opening the freshly installed bundle
    LaunchingNew,
    /// Finished, successfully or not
    Terminated,
}

/// How far [`Downloader::download`] goes when an update is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadMode {
    /// Download, install and launch.
    #[default]
    Full,
    /// Stop once the download is scheduled and report what would be fetched.
    /// Nothing is launched, even when the resolved build is installed.
    ScheduleOnly,
}

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The resolved build was already installed and has been opened.
    Launched {
        /// Installed build
        basename: String,
    },
    /// A new build was downloaded, installed and opened.
    Installed {
        /// Newly installed build
        basename: String,
        /// Size of the downloaded disk image
        bytes: u64,
    },
    /// [`DownloadMode::ScheduleOnly`]: the resolved build is installed.
    UpToDate {
        /// Installed build
        basename: String,
    },
    /// [`DownloadMode::ScheduleOnly`]: the transfer that would run.
    Scheduled {
        /// Disk image location
        url: Url,
        /// Build that would be installed
        basename: String,
    },
}

/// Called with the terminal error before [`Downloader::download`] returns it.
pub type ErrorHook = Arc<dyn Fn(&LauncherError) + Send + Sync>;

/// The host services the flow depends on.
#[derive(Clone)]
pub struct Collaborators {
    /// Mirror access
    pub http: Arc<dyn HttpClient>,
    /// File operations
    pub fs: Arc<dyn FileSystem>,
    /// Disk image attach/detach
    pub mounter: Arc<dyn DiskImageMounter>,
    /// Application launch
    pub opener: Arc<dyn AppOpener>,
}

impl Collaborators {
    /// The production services, with HTTP going through `proxy` when given.
    pub fn system(proxy: Option<&str>) -> Result<Self> {
        Ok(Self {
            http: Arc::new(ReqwestClient::new(proxy)?),
            fs: Arc::new(StdFileSystem),
            mounter: Arc::new(Hdiutil::default()),
            opener: Arc::new(SystemOpener),
        })
    }
}

/// Drives resolve, download, install and launch.
pub struct Downloader {
    paths: LauncherPaths,
    index_url: Url,
    mirror_url: Url,
    urls: Vec<String>,
    collaborators: Collaborators,
    disk_images: Arc<DiskImageManager>,
    status: StatusSender,
    mode: DownloadMode,
    quit_delay: Duration,
    on_error: Option<ErrorHook>,
    locales: Option<Vec<String>>,
    phase: Mutex<Phase>,
    installing: Arc<AsyncMutex<()>>,
}

impl fmt::Debug for Downloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Downloader")
            .field("install_root", &self.paths.install_root())
            .field("index_url", &self.index_url.as_str())
            .field("mirror_url", &self.mirror_url.as_str())
            .field("mode", &self.mode)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

impl Downloader {
    /// A downloader reading the default update index and resolving manifests
    /// below `mirror_url`.
    pub fn new(
        paths: LauncherPaths,
        mirror_url: Url,
        collaborators: Collaborators,
        status: StatusSender,
    ) -> Result<Self> {
        let disk_images = Arc::new(DiskImageManager::new(
            collaborators.mounter.clone(),
            collaborators.fs.clone(),
        ));

        Ok(Self {
            paths,
            index_url: update_index_url(DEFAULT_UPDATE_URL_PREFIX)?,
            mirror_url,
            urls: Vec::new(),
            collaborators,
            disk_images,
            status,
            mode: DownloadMode::Full,
            quit_delay: LAUNCH_QUIT_DELAY,
            on_error: None,
            locales: None,
            phase: Mutex::new(Phase::Idle),
            installing: Arc::new(AsyncMutex::new(())),
        })
    }

    /// Read the release index from `index_url` instead of the update host.
    #[must_use]
    pub fn with_index_url(mut self, index_url: Url) -> Self {
        self.index_url = index_url;
        self
    }

    /// Arguments passed through to the launched application.
    #[must_use]
    pub fn with_urls(mut self, urls: Vec<String>) -> Self {
        self.urls = urls;
        self
    }

    /// Choose between a full run and scheduling only.
    #[must_use]
    pub fn with_mode(mut self, mode: DownloadMode) -> Self {
        self.mode = mode;
        self
    }

    /// Wait this long after opening the application before returning.
    #[must_use]
    pub fn with_quit_delay(mut self, quit_delay: Duration) -> Self {
        self.quit_delay = quit_delay;
        self
    }

    /// Observe the terminal error.
    #[must_use]
    pub fn with_error_hook(mut self, hook: ErrorHook) -> Self {
        self.on_error = Some(hook);
        self
    }

    /// Locale preference for legacy manifests. Defaults to the system locale.
    #[must_use]
    pub fn with_locales(mut self, locales: Vec<String>) -> Self {
        self.locales = Some(locales);
        self
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The disk image state shared with the installer.
    pub fn disk_images(&self) -> Arc<DiskImageManager> {
        self.disk_images.clone()
    }

    fn enter(&self, next: Phase) {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        debug!("Phase {:?} -> {:?}", *phase, next);
        *phase = next;
    }

    /// Run the flow once.
    ///
    /// On failure the error hook (if any) sees the error before it is
    /// returned, any install step has stopped, and the disk image manager is
    /// closed.
    #[instrument(skip(self, cancel), fields(mirror = %self.mirror_url))]
    pub async fn download(&self, cancel: &CancellationToken) -> Result<DownloadOutcome> {
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(LauncherError::Cancelled),
            result = self.run(cancel) => result,
        };

        if let Err(error) = &result {
            warn!("Update flow failed in {:?}: {error}", self.phase());
            self.cleanup().await;
            if let Some(hook) = &self.on_error {
                hook(error);
            }
        }

        self.enter(Phase::Terminated);
        result
    }

    async fn cleanup(&self) {
        // Held by the blocking install task until it returns.
        let _idle = self.installing.lock().await;

        let disk_images = self.disk_images.clone();
        let detached = tokio::task::spawn_blocking(move || disk_images.close()).await;
        match detached {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Failed to detach disk image: {e}"),
            Err(e) => warn!("Detach task failed: {e}"),
        }
    }

    async fn run(&self, cancel: &CancellationToken) -> Result<DownloadOutcome> {
        self.enter(Phase::ResolvingUpdate);
        self.status.status("Getting update URL.");

        let mut resolver =
            UpdateResolver::new(self.collaborators.http.clone(), self.status.clone());
        if let Some(locales) = &self.locales {
            resolver = resolver.with_locales(locales.clone());
        }
        let release = resolver.resolve(&self.index_url, &self.mirror_url).await?;
        let basename = release.basename()?;

        let root = self.paths.install_root();
        self.status.status(format!("Creating '{}'.", root.display()));
        self.collaborators.fs.create_dir_all(root)?;

        let versions = VersionStore::new(self.paths.clone(), self.collaborators.fs.clone());
        if versions.is_current(&basename)? {
            info!("{basename} is already installed");
            if self.mode == DownloadMode::ScheduleOnly {
                return Ok(DownloadOutcome::UpToDate {
                    basename,
                });
            }
            self.enter(Phase::LaunchingExisting);
            self.launch().await?;
            return Ok(DownloadOutcome::Launched {
                basename,
            });
        }

        let url = release.url()?;
        self.status.status(format!("Fetching {basename}."));
        self.enter(Phase::Downloading);

        if self.mode == DownloadMode::ScheduleOnly {
            return Ok(DownloadOutcome::Scheduled {
                url,
                basename,
            });
        }

        let download = tempfile::Builder::new()
            .prefix(&format!("{BACKGROUND_IDENTIFIER}-"))
            .suffix(".download")
            .tempfile_in(self.paths.temp_dir())
            .map_err(|e| LauncherError::fs("create download file", self.paths.temp_dir(), e))?
            .into_temp_path();

        let status = self.status.clone();
        let progress = move |written: u64, expected: Option<u64>| status.progress(written, expected);
        let bytes = self.collaborators.http.download(&url, &download, &progress).await?;
        info!("Downloaded {basename} ({bytes} bytes)");

        self.enter(Phase::Installing);
        let installer = ArchiveInstaller::new(
            self.paths.clone(),
            self.collaborators.fs.clone(),
            self.disk_images.clone(),
            self.status.clone(),
        )
        .with_cancellation(cancel.clone());
        let downloaded = download.to_path_buf();
        let name = basename.clone();
        let guard = self.installing.clone().lock_owned().await;
        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            installer.install(&downloaded, &name)
        })
        .await
        .map_err(|e| LauncherError::FileSystem {
            operation: "install".to_string(),
            path: self.paths.bundle_path().display().to_string(),
            reason: e.to_string(),
        })??;
        drop(download);

        self.enter(Phase::LaunchingNew);
        self.launch().await?;
        Ok(DownloadOutcome::Installed {
            basename,
            bytes,
        })
    }

    async fn launch(&self) -> Result<()> {
        self.status.status("Launching Tor Browser.");
        launch_and_quit(
            self.collaborators.opener.clone(),
            self.paths.bundle_path(),
            self.urls.clone(),
            self.quit_delay,
        )
        .await
    }
}
