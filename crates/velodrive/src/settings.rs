use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use velodrive_gdrive::DriveSourceOptions;

use crate::cli::Cli;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub folder: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub package_id: Option<String>,

    #[serde(default)]
    pub application_name: Option<String>,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    #[serde(default)]
    pub debug_logging: bool,

    #[serde(default = "default_max_log_size_bytes")]
    pub max_log_size_bytes: u64,

    #[serde(default)]
    pub download_dir: Option<PathBuf>,
}

fn default_http_timeout() -> u64 {
    30
}

fn default_max_log_size_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            folder: None,
            api_key: None,
            package_id: None,
            application_name: None,
            http_timeout_secs: default_http_timeout(),
            debug_logging: false,
            max_log_size_bytes: default_max_log_size_bytes(),
            download_dir: None,
        }
    }
}

impl Settings {
    /// Read settings from `path`. A missing file yields the defaults.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|error| AppError::io("failed to read settings file", error))?;
        serde_json::from_str(&content).map_err(|source| AppError::InvalidSettings {
            path: path.display().to_string(),
            source,
        })
    }

    /// Command-line values win over the settings file.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(folder) = &cli.folder {
            self.folder = Some(folder.clone());
        }
        if let Some(api_key) = &cli.api_key {
            self.api_key = Some(api_key.clone());
        }
        if let Some(package_id) = &cli.package_id {
            self.package_id = Some(package_id.clone());
        }
        if let Some(name) = &cli.application_name {
            self.application_name = Some(name.clone());
        }
        if let Some(timeout) = cli.http_timeout_secs {
            self.http_timeout_secs = timeout;
        }
        if cli.debug {
            self.debug_logging = true;
        }
    }

    pub fn source_options(&self, settings_path: &Path) -> Result<DriveSourceOptions, AppError> {
        let require = |value: &Option<String>, name: &'static str, flag: &'static str| {
            value.clone().ok_or_else(|| AppError::MissingSetting {
                name,
                flag,
                settings_path: settings_path.display().to_string(),
            })
        };

        let mut options = DriveSourceOptions::new(
            require(&self.folder, "folder", "folder")?,
            require(&self.api_key, "api_key", "api-key")?,
            require(&self.package_id, "package_id", "package-id")?,
        );
        options.application_name.clone_from(&self.application_name);
        options.http_timeout = Duration::from_secs(self.http_timeout_secs.max(1));
        Ok(options)
    }
}
