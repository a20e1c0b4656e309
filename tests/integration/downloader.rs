use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tor_browser_launcher::config::LauncherPaths;
use tor_browser_launcher::core::LauncherError;
use tor_browser_launcher::downloader::{Collaborators, DownloadMode, DownloadOutcome, Downloader};
use tor_browser_launcher::http::HttpResponse;
use tor_browser_launcher::platform::FileSystem;
use tor_browser_launcher::resolver::{parse_url, preferred_locales};
use tor_browser_launcher::status::{StatusReceiver, StatusSender};
use tor_browser_launcher::test_utils::{
    CallLog, MockHttpClient, MockMounter, MockOpener, RecordingFileSystem, init_test_logging,
};

use super::{BASENAME, INDEX_HTML, manifest};

const INDEX: &str = "https://updates.test/torbrowser/?C=M;O=D";
const MIRROR: &str = "https://mirror.test/torbrowser/";
const MANIFEST: &str = "https://mirror.test/torbrowser/update_9z/release/download-macos.json";
const BINARY: &str = "file:///tmp/x/tor-browser-macos-14.5.6.dmg";
const INSTALL_ROOT: &str = "/Users/test/Library/Application Support/Tor Browser Launcher";

struct Setup {
    downloader: Downloader,
    receiver: StatusReceiver,
    fs: Arc<RecordingFileSystem>,
    http: Arc<MockHttpClient>,
    opener: Arc<MockOpener>,
    paths: LauncherPaths,
    _temp: TempDir,
}

fn setup(http: MockHttpClient, urls: Vec<String>) -> Setup {
    init_test_logging(None);

    let temp = TempDir::new().unwrap();
    let paths = LauncherPaths::new(INSTALL_ROOT).with_temp_dir(temp.path());
    let log = CallLog::default();
    let fs = Arc::new(RecordingFileSystem::new(log.clone()));
    let http = Arc::new(http);
    let opener = Arc::new(MockOpener::new(log.clone()));
    let collaborators = Collaborators {
        http: http.clone(),
        fs: fs.clone(),
        mounter: Arc::new(MockMounter::new(log)),
        opener: opener.clone(),
    };

    let (status, receiver) = StatusSender::channel();
    let downloader =
        Downloader::new(paths.clone(), parse_url(MIRROR).unwrap(), collaborators, status)
            .unwrap()
            .with_index_url(parse_url(INDEX).unwrap())
            .with_urls(urls)
            .with_locales(preferred_locales(None))
            .with_quit_delay(Duration::ZERO);

    Setup {
        downloader,
        receiver,
        fs,
        http,
        opener,
        paths,
        _temp: temp,
    }
}

fn mirror() -> MockHttpClient {
    MockHttpClient::new()
        .with_response(INDEX, HttpResponse::ok(INDEX_HTML))
        .with_response(MANIFEST, HttpResponse::ok(manifest(BINARY)))
}

#[tokio::test]
async fn test_fresh_install_is_scheduled() {
    let mut s = setup(mirror(), Vec::new());
    let downloader = s.downloader.with_mode(DownloadMode::ScheduleOnly);

    let outcome = downloader.download(&CancellationToken::new()).await.unwrap();

    match outcome {
        DownloadOutcome::Scheduled {
            url,
            basename,
        } => {
            assert_eq!(url.as_str(), BINARY);
            assert_eq!(basename, BASENAME);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let statuses = s.receiver.drain_statuses();
    assert_eq!(
        statuses,
        vec![
            "Getting update URL.".to_string(),
            "Finding update path.".to_string(),
            "Fetching downloads.json.".to_string(),
            format!("Creating '{INSTALL_ROOT}'."),
            format!("Fetching {BASENAME}."),
        ]
    );
    assert!(!statuses.iter().any(|s| s.starts_with("Launching")));
    assert_eq!(s.http.fetched(), vec![INDEX.to_string(), MANIFEST.to_string()]);
    assert!(s.opener.opened().is_empty());
}

#[tokio::test]
async fn test_installed_build_is_launched_with_urls() {
    let urls = vec!["https://check.torproject.org/".to_string()];
    let mut s = setup(mirror(), urls.clone());
    s.fs.add_dir(s.paths.bundle_path());
    s.fs.write_string(&s.paths.version_marker_path(), BASENAME).unwrap();

    let outcome = s.downloader.download(&CancellationToken::new()).await.unwrap();

    assert_eq!(
        outcome,
        DownloadOutcome::Launched {
            basename: BASENAME.to_string()
        }
    );
    assert_eq!(s.opener.opened(), vec![(s.paths.bundle_path(), urls)]);
    assert!(s.http.downloaded().is_empty());

    let statuses = s.receiver.drain_statuses();
    assert_eq!(statuses.last().map(String::as_str), Some("Launching Tor Browser."));
    assert!(!statuses.contains(&format!("Fetching {BASENAME}.")));
}

#[tokio::test]
async fn test_fresh_install_end_to_end() {
    let http = mirror().with_download(BINARY, vec![7u8; 64]);
    let s = setup(http, Vec::new());

    let outcome = s.downloader.download(&CancellationToken::new()).await.unwrap();

    assert_eq!(
        outcome,
        DownloadOutcome::Installed {
            basename: BASENAME.to_string(),
            bytes: 64,
        }
    );
    assert_eq!(s.fs.content(&s.paths.version_marker_path()).as_deref(), Some(BASENAME));
    assert_eq!(s.opener.opened().len(), 1);
    assert!(!s.downloader.disk_images().is_mounted());
}

#[tokio::test]
async fn test_manifest_without_binary() {
    let http = MockHttpClient::new()
        .with_response(INDEX, HttpResponse::ok(INDEX_HTML))
        .with_response(MANIFEST, HttpResponse::ok(r#"{"version":"14.5.6"}"#));
    let mut s = setup(http, Vec::new());

    let error = s.downloader.download(&CancellationToken::new()).await.unwrap_err();

    assert_eq!(error, LauncherError::NoBinaryUrl);
    assert_eq!(error.exit_grace_period(), Duration::from_secs(2));
    let statuses = s.receiver.drain_statuses();
    assert_eq!(statuses.first().map(String::as_str), Some("Getting update URL."));
    assert!(statuses.contains(&"Finding update path.".to_string()));
    assert!(statuses.contains(&"Fetching downloads.json.".to_string()));
    assert!(s.opener.opened().is_empty());
}

#[tokio::test]
async fn test_index_without_update_path() {
    let http = MockHttpClient::new()
        .with_response(INDEX, HttpResponse::ok("<a href=\"update_9/\">update_9/</a>\n"));
    let s = setup(http, Vec::new());

    let error = s.downloader.download(&CancellationToken::new()).await.unwrap_err();

    assert_eq!(error, LauncherError::NoUpdatePath);
    assert_eq!(error.exit_grace_period(), Duration::from_secs(10));
    assert_eq!(s.http.fetched(), vec![INDEX.to_string()]);
}
