use thiserror::Error;
use velodrive_backend::SourceError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Source(#[from] SourceError),

    #[error("Missing setting '{name}': pass --{flag} or set it in {settings_path}")]
    MissingSetting {
        name: &'static str,
        flag: &'static str,
        settings_path: String,
    },

    #[error("Invalid settings file {path}: {source}")]
    InvalidSettings {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize feed: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    pub fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }
}
