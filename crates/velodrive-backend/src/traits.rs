use async_trait::async_trait;
use std::path::Path;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::SourceError;
use crate::types::{FeedRequest, ReleaseAsset, ReleaseFeed};

/// A place release packages can be listed and fetched from.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Enumerate the release assets currently visible to this source.
    ///
    /// # Errors
    /// Returns an error if the source is disposed or the remote listing fails.
    async fn get_release_feed(&self, request: &FeedRequest) -> Result<ReleaseFeed, SourceError>;

    /// Download `asset` to `local_path`, sending integer percentages on
    /// `progress`. On success the asset's checksums are filled in.
    ///
    /// # Errors
    /// Returns an error if the asset was never listed, the transfer fails or
    /// is cancelled, or the source is disposed.
    async fn download_release_entry(
        &self,
        asset: &mut ReleaseAsset,
        local_path: &Path,
        progress: &mpsc::Sender<u8>,
        cancel: &CancellationToken,
    ) -> Result<(), SourceError>;
}

impl<T: UpdateSource + 'static> From<T> for Box<dyn UpdateSource> {
    fn from(source: T) -> Self {
        Box::new(source)
    }
}
