use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A file as reported by the remote storage listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub name: String,
    pub size: Option<u64>,
    pub remote_id: String,
}

impl RemoteFile {
    #[must_use]
    pub fn new(name: impl Into<String>, size: Option<u64>, remote_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            remote_id: remote_id.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    Full,
    Delta,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "Full"),
            Self::Delta => write!(f, "Delta"),
        }
    }
}

/// One downloadable package in a release feed.
///
/// `checksum` (uppercase SHA-1) and `sha256` stay empty until the asset has
/// been downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReleaseAsset {
    pub package_id: String,
    pub version: Version,
    #[serde(rename = "Type")]
    pub kind: AssetKind,
    pub file_name: String,
    #[serde(rename = "SHA1", default)]
    pub checksum: Option<String>,
    #[serde(rename = "SHA256", default)]
    pub sha256: Option<String>,
    pub size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReleaseFeed {
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl ReleaseFeed {
    #[must_use]
    pub fn new(assets: Vec<ReleaseAsset>) -> Self {
        Self { assets }
    }

    /// Find an asset by file name, ignoring ASCII case.
    #[must_use]
    pub fn find(&self, file_name: &str) -> Option<&ReleaseAsset> {
        self.assets
            .iter()
            .find(|asset| asset.file_name.eq_ignore_ascii_case(file_name))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Parameters the host passes when asking for a feed.
///
/// None of these narrow the listing; a source returns every package it sees.
#[derive(Debug, Clone, Default)]
pub struct FeedRequest {
    pub channel: Option<String>,
    pub staging_id: Option<String>,
    pub latest_local_release: Option<ReleaseAsset>,
}
