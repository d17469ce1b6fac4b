mod client;
mod folder;
mod query;
mod source;

pub use client::{DEFAULT_BASE_URL, DriveClient};
pub use folder::parse_folder_id;
pub use query::package_query;
pub use source::{DriveSourceOptions, GoogleDriveSource};

pub use velodrive_backend::{
    AssetKind, FeedRequest, ReleaseAsset, ReleaseFeed, RemoteFile, SourceError, UpdateSource,
};
