//! Source-independent release feed logic for velodrive.
//!
//! This crate holds everything that does not depend on a concrete storage
//! backend:
//! - Turning a remote file listing into a release feed.
//! - The case-insensitive file name to remote id index.
//! - Streaming a download to disk with progress and cancellation.
//! - Content digests of downloaded packages.

pub mod checksum;
pub mod download;
mod feed;

/// Feed construction from remote listings.
pub use feed::{
    FileNameIndex, PACKAGE_EXTENSION, VersionTokenError, build_feed, classify_kind, extract_version,
};
/// Streaming transfer helper and its error type.
pub use download::{TransferError, stream_to_file};
