use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use velodrive_backend::{FeedRequest, ReleaseAsset, ReleaseFeed, SourceError, UpdateSource};
use velodrive_core::checksum::{sha1_file, sha256_file};
use velodrive_core::{FileNameIndex, PACKAGE_EXTENSION, TransferError, build_feed, stream_to_file};

use crate::client::DriveClient;
use crate::folder::parse_folder_id;
use crate::query::package_query;

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct DriveSourceOptions {
    /// Folder id or a `.../folders/<id>` sharing URL.
    pub folder: String,
    pub api_key: String,
    pub package_id: String,
    pub application_name: Option<String>,
    pub http_timeout: Duration,
    pub base_url: Option<String>,
}

impl DriveSourceOptions {
    #[must_use]
    pub fn new(
        folder: impl Into<String>,
        api_key: impl Into<String>,
        package_id: impl Into<String>,
    ) -> Self {
        Self {
            folder: folder.into(),
            api_key: api_key.into(),
            package_id: package_id.into(),
            application_name: None,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            base_url: None,
        }
    }
}

/// Release source backed by a Google Drive folder.
///
/// The Drive client is held until [`GoogleDriveSource::close`] is called or
/// the source is dropped; afterwards every operation fails with
/// [`SourceError::Disposed`].
pub struct GoogleDriveSource {
    folder_id: String,
    package_id: String,
    client: Mutex<Option<DriveClient>>,
    index: Mutex<FileNameIndex>,
}

impl GoogleDriveSource {
    /// Validate `options` and open the Drive client.
    ///
    /// # Errors
    /// Returns a configuration error for a missing folder, API key or package
    /// id, or a malformed folder URL.
    pub fn new(options: DriveSourceOptions) -> Result<Self, SourceError> {
        let folder_id = parse_folder_id(&options.folder)?;

        let api_key = options.api_key.trim();
        if api_key.is_empty() {
            return Err(SourceError::config("api key", "API key is required"));
        }

        let package_id = options.package_id.trim();
        if package_id.is_empty() {
            return Err(SourceError::config("package id", "package id is required"));
        }

        let mut client = DriveClient::new(
            api_key,
            options.application_name.as_deref(),
            options.http_timeout,
        )?;
        if let Some(base_url) = options.base_url.as_deref() {
            client = client.with_base_url(base_url);
        }

        debug!("Opened Google Drive source for folder {folder_id}");
        Ok(Self {
            folder_id,
            package_id: package_id.to_string(),
            client: Mutex::new(Some(client)),
            index: Mutex::new(FileNameIndex::new()),
        })
    }

    #[must_use]
    pub fn folder_id(&self) -> &str {
        &self.folder_id
    }

    #[must_use]
    pub fn package_id(&self) -> &str {
        &self.package_id
    }

    /// Release the Drive client. Calling this more than once is harmless.
    pub fn close(&self) {
        let released = self
            .client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if released.is_some() {
            debug!("Closed Google Drive source for folder {}", self.folder_id);
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn client(&self) -> Result<DriveClient, SourceError> {
        self.client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(SourceError::Disposed)
    }

    fn resolve(&self, file_name: &str) -> Option<String> {
        self.index
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .resolve(file_name)
            .map(str::to_string)
    }
}

fn transfer_error(file_name: &str, error: TransferError) -> SourceError {
    match error {
        TransferError::Cancelled => SourceError::Cancelled,
        TransferError::Stream(details) => SourceError::download_failed(file_name, details),
        TransferError::Io { context, source } => SourceError::IoError {
            kind: source.kind(),
            message: format!("{context}: {source}"),
        },
    }
}

#[async_trait]
impl UpdateSource for GoogleDriveSource {
    async fn get_release_feed(&self, request: &FeedRequest) -> Result<ReleaseFeed, SourceError> {
        let client = self.client()?;
        debug!(
            "Fetching release feed (channel: {}, staging: {}, latest local: {})",
            request.channel.as_deref().unwrap_or("default"),
            request.staging_id.as_deref().unwrap_or("none"),
            request
                .latest_local_release
                .as_ref()
                .map_or_else(|| "none".to_string(), |asset| asset.version.to_string()),
        );

        let query = package_query(&self.folder_id, PACKAGE_EXTENSION);
        let files = client.list_files(&query).await.inspect_err(|e| {
            error!(
                "Failed to list release files in folder {}: {e}",
                self.folder_id
            );
        })?;

        let feed = {
            let mut index = self.index.lock().unwrap_or_else(PoisonError::into_inner);
            build_feed(&files, &self.package_id, &mut index)
        };

        info!(
            "Found {} release packages out of {} files in folder {}",
            feed.len(),
            files.len(),
            self.folder_id
        );
        Ok(feed)
    }

    async fn download_release_entry(
        &self,
        asset: &mut ReleaseAsset,
        local_path: &Path,
        progress: &mpsc::Sender<u8>,
        cancel: &CancellationToken,
    ) -> Result<(), SourceError> {
        let client = self.client()?;
        let remote_id = self
            .resolve(&asset.file_name)
            .ok_or_else(|| SourceError::NotFound {
                file_name: asset.file_name.clone(),
            })?;

        let remote_size = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(SourceError::Cancelled),
            size = client.file_size(&remote_id) => size?,
        };
        let total = remote_size.unwrap_or(asset.size);

        info!(
            "Downloading {} ({total} bytes) to {}",
            asset.file_name,
            local_path.display()
        );
        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(SourceError::Cancelled),
            response = client.open_media(&remote_id) => response
                .map_err(|error| SourceError::download_failed(&asset.file_name, error.to_string()))?,
        };

        let written = stream_to_file(response.bytes_stream(), total, local_path, progress, cancel)
            .await
            .map_err(|error| transfer_error(&asset.file_name, error))?;

        if total > 0 && written != total {
            return Err(SourceError::download_failed(
                &asset.file_name,
                format!("expected {total} bytes, received {written}"),
            ));
        }

        asset.checksum = Some(sha1_file(local_path)?);
        asset.sha256 = Some(sha256_file(local_path)?);
        debug!(
            "Checksum of {}: {}",
            asset.file_name,
            asset.checksum.as_deref().unwrap_or_default()
        );
        Ok(())
    }
}
