use std::sync::Arc;

use tempfile::TempDir;
use tor_browser_launcher::config::LauncherPaths;
use tor_browser_launcher::constants::APP_BUNDLE_NAME;
use tor_browser_launcher::installer::{ArchiveInstaller, DiskImageManager};
use tor_browser_launcher::platform::{DiskImageMounter, FileSystem, StdFileSystem};
use tor_browser_launcher::status::StatusSender;
use tor_browser_launcher::version::VersionStore;

use super::BASENAME;

/// Mounts by copying a prepared directory tree to the mount point.
struct DirectoryMounter {
    contents: std::path::PathBuf,
}

impl DiskImageMounter for DirectoryMounter {
    fn attach(
        &self,
        _image: &std::path::Path,
        mount_point: &std::path::Path,
    ) -> tor_browser_launcher::core::Result<()> {
        StdFileSystem.copy_tree(&self.contents, mount_point)
    }

    fn detach(&self, mount_point: &std::path::Path) -> tor_browser_launcher::core::Result<()> {
        StdFileSystem.remove_if_exists(mount_point)
    }
}

#[test]
fn test_version_marker_round_trip_on_disk() {
    let temp = TempDir::new().unwrap();
    let paths = LauncherPaths::new(temp.path().join("root"));
    let store = VersionStore::new(paths.clone(), Arc::new(StdFileSystem));

    assert_eq!(store.load().unwrap(), None);
    assert!(!store.is_installed());

    store.store(BASENAME).unwrap();
    assert_eq!(store.load().unwrap().as_deref(), Some(BASENAME));
    assert_eq!(std::fs::read_to_string(paths.version_marker_path()).unwrap(), BASENAME);

    // Without a bundle the marker alone does not count as installed.
    assert!(!store.is_current(BASENAME).unwrap());
    std::fs::create_dir_all(paths.bundle_path()).unwrap();
    assert!(store.is_current(BASENAME).unwrap());
    assert!(!store.is_current("tor-browser-macos-14.5.7.dmg").unwrap());

    store.clear().unwrap();
    assert_eq!(store.load().unwrap(), None);
}

#[test]
fn test_install_replaces_bundle_on_disk() {
    let temp = TempDir::new().unwrap();
    let image_contents = temp.path().join("image");
    let new_bundle = image_contents.join(APP_BUNDLE_NAME).join("Contents");
    std::fs::create_dir_all(&new_bundle).unwrap();
    std::fs::write(new_bundle.join("Info.plist"), "new").unwrap();

    let scratch = temp.path().join("tmp");
    std::fs::create_dir_all(&scratch).unwrap();
    let paths = LauncherPaths::new(temp.path().join("root")).with_temp_dir(&scratch);
    std::fs::create_dir_all(paths.bundle_path().join("Contents")).unwrap();
    std::fs::write(paths.bundle_path().join("Contents").join("stale"), "old").unwrap();

    let downloaded = scratch.join("download.tmp");
    std::fs::write(&downloaded, b"dmg").unwrap();

    let fs: Arc<dyn FileSystem> = Arc::new(StdFileSystem);
    let disk_images = Arc::new(DiskImageManager::new(
        Arc::new(DirectoryMounter {
            contents: image_contents,
        }),
        fs.clone(),
    ));
    let installer =
        ArchiveInstaller::new(paths.clone(), fs, disk_images.clone(), StatusSender::disconnected());

    installer.install(&downloaded, BASENAME).unwrap();

    let bundle = paths.bundle_path();
    assert_eq!(std::fs::read_to_string(bundle.join("Contents").join("Info.plist")).unwrap(), "new");
    assert!(!bundle.join("Contents").join("stale").exists());
    assert!(!downloaded.exists());
    assert!(!scratch.join(BASENAME).exists());
    assert!(!disk_images.is_mounted());
    assert!(installer.versions().is_current(BASENAME).unwrap());
}
