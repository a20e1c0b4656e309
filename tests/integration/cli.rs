use assert_cmd::Command;
use predicates::prelude::*;
use reqwest::Url;
use tempfile::TempDir;

use super::{BASENAME, write_file_mirror};

fn launcher(root: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tor-browser-launcher").unwrap();
    cmd.env("TBL_INSTALL_ROOT", root.path())
        .env("TBL_NO_PROGRESS", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn file_url(path: &std::path::Path) -> String {
    Url::from_directory_path(path).unwrap().to_string()
}

#[test]
fn test_status_before_install() {
    let root = TempDir::new().unwrap();

    launcher(&root)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("not installed"))
        .stdout(predicate::str::contains("Tor Browser.app"))
        .stdout(predicate::str::contains("https://aus1.torproject.org/torbrowser/"));
}

#[test]
fn test_status_reports_installed_build() {
    let root = TempDir::new().unwrap();
    std::fs::create_dir_all(root.path().join("Tor Browser.app")).unwrap();
    std::fs::write(root.path().join("version"), BASENAME).unwrap();

    launcher(&root)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains(BASENAME));
}

#[test]
fn test_settings_are_saved_and_shown() {
    let root = TempDir::new().unwrap();

    launcher(&root)
        .args(["settings", "--mirror", "1", "--proxy", "127.0.0.1:9050", "--use-proxy", "true"])
        .assert()
        .success();

    let saved = std::fs::read_to_string(root.path().join("settings.toml")).unwrap();
    assert!(saved.contains("mirror_index = 1"));
    assert!(saved.contains("127.0.0.1:9050"));

    launcher(&root)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("https://dist.torproject.org/torbrowser/"))
        .stdout(predicate::str::contains("127.0.0.1:9050"));
}

#[test]
fn test_settings_reject_invalid_values() {
    let root = TempDir::new().unwrap();

    launcher(&root)
        .args(["settings", "--mirror", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));

    launcher(&root)
        .args(["settings", "--proxy", "localhost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("host:port"));

    assert!(!root.path().join("settings.toml").exists());
}

#[test]
fn test_uninstall_removes_bundle_and_marker() {
    let root = TempDir::new().unwrap();
    std::fs::create_dir_all(root.path().join("Tor Browser.app").join("Contents")).unwrap();
    std::fs::write(root.path().join("version"), BASENAME).unwrap();

    launcher(&root).arg("uninstall").assert().success();

    assert!(!root.path().join("Tor Browser.app").exists());
    assert!(!root.path().join("version").exists());
}

#[test]
fn test_dry_run_against_file_mirror() {
    let root = TempDir::new().unwrap();
    let mirror = TempDir::new().unwrap();
    write_file_mirror(mirror.path(), "file:///tmp/x/tor-browser-macos-14.5.6.dmg");

    let index = Url::from_file_path(mirror.path().join("index.html")).unwrap().to_string();
    launcher(&root)
        .args(["run", "--dry-run", "--no-wait", "--index-url", &index])
        .args(["--mirror-url", &file_url(&mirror.path().join("mirror"))])
        .assert()
        .success()
        .stdout(predicate::str::contains(BASENAME))
        .stdout(predicate::str::contains("file:///tmp/x/tor-browser-macos-14.5.6.dmg"));

    // The install root is created, but nothing is installed.
    assert!(root.path().exists());
    assert!(!root.path().join("version").exists());
}

#[test]
fn test_run_fails_without_update_path() {
    let root = TempDir::new().unwrap();
    let mirror = TempDir::new().unwrap();
    std::fs::write(mirror.path().join("index.html"), "<a href=\"14.5.6/\">14.5.6/</a>\n").unwrap();

    let index = Url::from_file_path(mirror.path().join("index.html")).unwrap().to_string();
    launcher(&root)
        .args(["run", "--no-wait", "--index-url", &index])
        .args(["--mirror-url", &file_url(mirror.path())])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to find update path"));
}
