use std::collections::HashMap;
use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;
use semver::Version;
use thiserror::Error;
use velodrive_backend::{AssetKind, ReleaseAsset, ReleaseFeed, RemoteFile};

pub const PACKAGE_EXTENSION: &str = ".nupkg";
const DELTA_MARKER: &str = "-delta";

static VERSION_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9]+\.[0-9]+\.[0-9]+(?:\.[0-9]+)?").expect("version pattern is valid")
});

#[derive(Debug, Error)]
pub enum VersionTokenError {
    #[error("no version token in {name}")]
    Missing { name: String },
    #[error("version token {token} in {name} is not a semantic version: {source}")]
    Invalid {
        name: String,
        token: String,
        #[source]
        source: semver::Error,
    },
}

/// Maps package file names to the storage id they were listed under.
///
/// Lookups ignore case. Entries are only ever added or replaced.
#[derive(Debug, Clone, Default)]
pub struct FileNameIndex {
    entries: HashMap<String, String>,
}

impl FileNameIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, file_name: &str, remote_id: impl Into<String>) {
        self.entries
            .insert(file_name.to_lowercase(), remote_id.into());
    }

    #[must_use]
    pub fn resolve(&self, file_name: &str) -> Option<&str> {
        self.entries
            .get(&file_name.to_lowercase())
            .map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn has_package_extension(name: &str) -> bool {
    let ext_len = PACKAGE_EXTENSION.len();
    name.len() >= ext_len
        && name
            .get(name.len() - ext_len..)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(PACKAGE_EXTENSION))
}

fn strip_package_extension(name: &str) -> &str {
    if has_package_extension(name) {
        &name[..name.len() - PACKAGE_EXTENSION.len()]
    } else {
        name
    }
}

/// Extract the first dotted numeric version (three or four components) from
/// a package file name.
///
/// # Errors
/// Returns an error when the name carries no version token or the token is
/// not a valid semantic version.
pub fn extract_version(file_name: &str) -> Result<Version, VersionTokenError> {
    let stem = strip_package_extension(file_name);
    let token = VERSION_TOKEN
        .find(stem)
        .ok_or_else(|| VersionTokenError::Missing {
            name: file_name.to_string(),
        })?
        .as_str();

    Version::parse(token).map_err(|source| VersionTokenError::Invalid {
        name: file_name.to_string(),
        token: token.to_string(),
        source,
    })
}

#[must_use]
pub fn classify_kind(file_name: &str) -> AssetKind {
    if file_name.contains(DELTA_MARKER) {
        AssetKind::Delta
    } else {
        AssetKind::Full
    }
}

/// Build a release feed from a remote listing, recording every accepted file
/// in `index`.
///
/// Files that are not packages are skipped. Packages whose version cannot be
/// read are logged and left out; they never fail the whole feed.
pub fn build_feed(files: &[RemoteFile], package_id: &str, index: &mut FileNameIndex) -> ReleaseFeed {
    let mut assets = Vec::with_capacity(files.len());

    for file in files {
        if !has_package_extension(&file.name) {
            debug!("Skipping non-package file {}", file.name);
            continue;
        }

        let version = match extract_version(&file.name) {
            Ok(version) => version,
            Err(error) => {
                warn!("Ignoring release file: {error}");
                continue;
            }
        };

        index.insert(&file.name, file.remote_id.clone());
        assets.push(ReleaseAsset {
            package_id: package_id.to_string(),
            version,
            kind: classify_kind(&file.name),
            file_name: file.name.clone(),
            checksum: None,
            sha256: None,
            size: file.size.unwrap_or(0),
        });
    }

    ReleaseFeed::new(assets)
}
