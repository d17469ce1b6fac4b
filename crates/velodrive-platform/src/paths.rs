use std::path::{Path, PathBuf};
use thiserror::Error;

const APP_DIR: &str = "velodrive";
const SETTINGS_FILE: &str = "settings.json";
const LOG_FILE: &str = "velodrive.log";
const DOWNLOADS_DIR: &str = "packages";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AppPathsError {
    #[error("Could not determine home directory")]
    HomeDirUnavailable,
    #[error("Could not determine config directory")]
    ConfigDirUnavailable,
    #[error("Could not determine cache directory")]
    CacheDirUnavailable,
    #[error("Could not determine data directory")]
    DataDirUnavailable,
}

/// Per-user locations for settings, logs and downloaded release packages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl AppPaths {
    /// Resolve the platform's per-user directories.
    ///
    /// # Errors
    /// Returns an error when a base directory cannot be determined.
    #[cfg(target_os = "macos")]
    pub fn new() -> Result<Self, AppPathsError> {
        let home = dirs::home_dir().ok_or(AppPathsError::HomeDirUnavailable)?;
        let support = home.join("Library/Application Support");
        Ok(Self::from_bases(&support, &home.join("Library/Caches"), &support))
    }

    /// Resolve the platform's per-user directories.
    ///
    /// # Errors
    /// Returns an error when a base directory cannot be determined.
    #[cfg(not(target_os = "macos"))]
    pub fn new() -> Result<Self, AppPathsError> {
        let config = dirs::config_dir().ok_or(AppPathsError::ConfigDirUnavailable)?;
        let cache = dirs::cache_dir().ok_or(AppPathsError::CacheDirUnavailable)?;
        let data = dirs::data_dir().ok_or(AppPathsError::DataDirUnavailable)?;
        Ok(Self::from_bases(&config, &cache, &data))
    }

    fn from_bases(config: &Path, cache: &Path, data: &Path) -> Self {
        Self {
            config_dir: config.join(APP_DIR),
            cache_dir: cache.join(APP_DIR),
            data_dir: data.join(APP_DIR),
        }
    }

    /// Lay every directory out under a single root, e.g. for a portable
    /// install.
    #[must_use]
    pub fn under(root: &Path) -> Self {
        Self {
            config_dir: root.join("config"),
            cache_dir: root.join("cache"),
            data_dir: root.join("data"),
        }
    }

    #[must_use]
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }

    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }

    /// Default location for downloaded release packages.
    #[must_use]
    pub fn downloads_dir(&self) -> PathBuf {
        self.cache_dir.join(DOWNLOADS_DIR)
    }

    /// Create the settings, log and download directories.
    ///
    /// # Errors
    /// Returns an error if any directory cannot be created.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in [&self.config_dir, &self.data_dir, &self.downloads_dir()] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}
