use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Serve release packages for an auto-updater out of a Google Drive folder.
#[derive(Debug, Parser)]
#[command(name = "velodrive", version, about)]
pub struct Cli {
    /// Drive folder id or sharing URL.
    #[arg(long, global = true, env = "VELODRIVE_FOLDER")]
    pub folder: Option<String>,

    /// Google API key with Drive read access.
    #[arg(long, global = true, env = "VELODRIVE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Package id written into every asset of the feed.
    #[arg(long, global = true, env = "VELODRIVE_PACKAGE_ID")]
    pub package_id: Option<String>,

    /// Name sent to Google as part of the user agent.
    #[arg(long, global = true, env = "VELODRIVE_APP_NAME")]
    pub application_name: Option<String>,

    /// Read timeout for Drive requests, in seconds.
    #[arg(long, global = true)]
    pub http_timeout_secs: Option<u64>,

    /// Settings file to use instead of the per-user default.
    #[arg(long, global = true, env = "VELODRIVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the release packages in the folder.
    Feed {
        /// Release channel requested by the updater.
        #[arg(long)]
        channel: Option<String>,

        /// Print the feed as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Download one release package and print its SHA-1.
    Download {
        /// Package file name as listed in the feed.
        file_name: String,

        /// Destination file or directory.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}
