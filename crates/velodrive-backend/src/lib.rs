mod error;
mod traits;
mod types;

pub use error::{NetworkStage, SourceError};
pub use traits::UpdateSource;
pub use types::{AssetKind, FeedRequest, ReleaseAsset, ReleaseFeed, RemoteFile};
