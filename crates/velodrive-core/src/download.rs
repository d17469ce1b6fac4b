use std::path::Path;

use futures_util::{Stream, StreamExt};
use log::{debug, info};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("download stream error: {0}")]
    Stream(String),
    #[error("download cancelled")]
    Cancelled,
}

impl TransferError {
    fn io_with_path(context: &'static str, path: &Path, source: &std::io::Error) -> Self {
        Self::Io {
            context,
            source: std::io::Error::new(source.kind(), format!("{}: {source}", path.display())),
        }
    }
}

fn percent_of(downloaded: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = u128::from(downloaded) * 100 / u128::from(total);
    // 100 is reserved for completion
    u8::try_from(percent.min(99)).unwrap_or(99)
}

// A receiver that stops draining must not keep a cancelled transfer alive.
async fn report(
    progress: &mpsc::Sender<u8>,
    percent: u8,
    cancel: &CancellationToken,
) -> Result<(), TransferError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(TransferError::Cancelled),
        _ = progress.send(percent) => Ok(()),
    }
}

/// Write `stream` to `dest`, reporting whole percentages of `total` on
/// `progress`.
///
/// Percentages only ever increase and the last report is a single `100`
/// once the stream is fully written. On failure or cancellation whatever was
/// already written stays on disk.
///
/// # Errors
/// Returns an error if the file cannot be written, the stream yields an error,
/// or `cancel` fires before the stream ends.
pub async fn stream_to_file<S, B, E>(
    mut stream: S,
    total: u64,
    dest: &Path,
    progress: &mpsc::Sender<u8>,
    cancel: &CancellationToken,
) -> Result<u64, TransferError>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut file = tokio::fs::File::create(dest).await.map_err(|error| {
        TransferError::io_with_path("failed to create download file", dest, &error)
    })?;

    let mut downloaded: u64 = 0;
    let mut reported: Option<u8> = None;

    loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("Download to {} cancelled after {downloaded} bytes", dest.display());
                return Err(TransferError::Cancelled);
            }
            next = stream.next() => next,
        };

        let Some(chunk) = next else {
            break;
        };
        let chunk = chunk.map_err(|error| TransferError::Stream(error.to_string()))?;
        let bytes = chunk.as_ref();
        file.write_all(bytes).await.map_err(|error| {
            TransferError::io_with_path("failed to write download data", dest, &error)
        })?;
        downloaded += bytes.len() as u64;

        if total > 0 {
            let percent = percent_of(downloaded, total);
            if reported.is_none_or(|last| percent > last) {
                reported = Some(percent);
                report(progress, percent, cancel).await?;
            }
        }
    }

    file.flush().await.map_err(|error| {
        TransferError::io_with_path("failed to flush download file", dest, &error)
    })?;
    drop(file);

    report(progress, 100, cancel).await?;
    info!("Download complete: {downloaded} bytes to {}", dest.display());
    Ok(downloaded)
}
