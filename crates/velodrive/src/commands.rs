use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use log::{debug, info};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use velodrive_backend::{FeedRequest, ReleaseAsset, ReleaseFeed, SourceError, UpdateSource};

use crate::error::AppError;

const PROGRESS_CHANNEL_CAPACITY: usize = 128;

fn render_feed(feed: &ReleaseFeed) -> String {
    let mut out = String::new();
    for asset in &feed.assets {
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}",
            asset.file_name, asset.version, asset.kind, asset.size
        );
    }
    out
}

/// Fetch the feed and render it either as tab-separated lines or JSON.
///
/// # Errors
/// Returns an error if the feed cannot be fetched or serialized.
pub async fn feed(
    source: &dyn UpdateSource,
    channel: Option<String>,
    json: bool,
) -> Result<String, AppError> {
    let request = FeedRequest {
        channel,
        ..FeedRequest::default()
    };
    let feed = source.get_release_feed(&request).await?;

    if json {
        let mut rendered = serde_json::to_string_pretty(&feed)?;
        rendered.push('\n');
        Ok(rendered)
    } else {
        Ok(render_feed(&feed))
    }
}

/// Directory downloads go to when no output path is given: the configured
/// one, else `fallback`. It is created so packages keep their own names.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn download_dir(
    configured: Option<PathBuf>,
    fallback: Option<PathBuf>,
) -> Result<PathBuf, AppError> {
    let dir = configured
        .or(fallback)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir)
        .map_err(|error| AppError::io("failed to create download directory", error))?;
    Ok(dir)
}

fn destination(output: &Path, file_name: &str) -> PathBuf {
    if output.is_dir() {
        output.join(file_name)
    } else {
        output.to_path_buf()
    }
}

/// Download one package from the feed to `output` (a file path, or a
/// directory to place it in).
///
/// # Errors
/// Returns an error if the package is not in the feed, the destination
/// cannot be prepared, or the transfer fails.
pub async fn download(
    source: &dyn UpdateSource,
    file_name: &str,
    output: &Path,
    cancel: &CancellationToken,
) -> Result<ReleaseAsset, AppError> {
    let feed = source.get_release_feed(&FeedRequest::default()).await?;
    let mut asset = feed
        .find(file_name)
        .cloned()
        .ok_or_else(|| SourceError::NotFound {
            file_name: file_name.to_string(),
        })?;

    let dest = destination(output, &asset.file_name);
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|error| AppError::io("failed to create download directory", error))?;
    }

    let (tx, mut rx) = mpsc::channel::<u8>(PROGRESS_CHANNEL_CAPACITY);
    let label = asset.file_name.clone();
    let reporter = tokio::spawn(async move {
        while let Some(percent) = rx.recv().await {
            if percent % 10 == 0 {
                info!("{label}: {percent}%");
            } else {
                debug!("{label}: {percent}%");
            }
        }
    });

    let result = source
        .download_release_entry(&mut asset, &dest, &tx, cancel)
        .await;
    drop(tx);
    let _ = reporter.await;
    result?;

    info!("Saved {} to {}", asset.file_name, dest.display());
    Ok(asset)
}
