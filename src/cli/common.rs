//! Shared state for CLI commands

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::config::{LauncherPaths, Settings};
use crate::downloader::Collaborators;
use crate::installer::{ArchiveInstaller, DiskImageManager};
use crate::status::StatusSender;

/// Paths and settings every command starts from.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Install root, bundle and marker locations
    pub paths: LauncherPaths,
    /// Persisted preferences
    pub settings: Settings,
}

impl CommandContext {
    /// Resolve paths from the environment and load the settings file.
    pub async fn load() -> Result<Self> {
        let paths = LauncherPaths::from_environment()?;
        let settings = Settings::load_from(&paths.settings_path())
            .await
            .context("Failed to load launcher settings")?;
        Ok(Self {
            paths,
            settings,
        })
    }

    /// An installer using the production file system and `hdiutil`.
    pub fn installer(&self, status: StatusSender) -> Result<ArchiveInstaller> {
        let collaborators = Collaborators::system(None)?;
        let disk_images =
            Arc::new(DiskImageManager::new(collaborators.mounter, collaborators.fs.clone()));
        Ok(ArchiveInstaller::new(self.paths.clone(), collaborators.fs, disk_images, status))
    }
}
