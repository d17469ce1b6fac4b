use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Invalid configuration for {field}: {details}")]
    Config {
        field: &'static str,
        details: String,
    },

    #[error("Network error during {operation} ({stage}): {details}")]
    NetworkError {
        operation: &'static str,
        stage: NetworkStage,
        details: String,
    },

    #[error("Release file not found in feed: {file_name}")]
    NotFound { file_name: String },

    #[error("Download of {file_name} failed: {details}")]
    DownloadFailed { file_name: String, details: String },

    #[error("Download was cancelled")]
    Cancelled,

    #[error("Update source has already been disposed")]
    Disposed,

    #[error("IO error ({kind}): {message}")]
    IoError {
        kind: std::io::ErrorKind,
        message: String,
    },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStage {
    #[error("request")]
    Request,
    #[error("response parse")]
    ResponseParse,
}

impl SourceError {
    pub fn config(field: &'static str, details: impl Into<String>) -> Self {
        Self::Config {
            field,
            details: details.into(),
        }
    }

    pub fn network_request(operation: &'static str, details: impl Into<String>) -> Self {
        Self::NetworkError {
            operation,
            stage: NetworkStage::Request,
            details: details.into(),
        }
    }

    pub fn network_request_from<E>(operation: &'static str, error: E) -> Self
    where
        E: std::fmt::Display,
    {
        Self::network_request(operation, error.to_string())
    }

    pub fn network_parse(operation: &'static str, details: impl Into<String>) -> Self {
        Self::NetworkError {
            operation,
            stage: NetworkStage::ResponseParse,
            details: details.into(),
        }
    }

    pub fn network_parse_from<E>(operation: &'static str, error: E) -> Self
    where
        E: std::fmt::Display,
    {
        Self::network_parse(operation, error.to_string())
    }

    pub fn download_failed(file_name: impl Into<String>, details: impl Into<String>) -> Self {
        Self::DownloadFailed {
            file_name: file_name.into(),
            details: details.into(),
        }
    }
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        SourceError::IoError {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
