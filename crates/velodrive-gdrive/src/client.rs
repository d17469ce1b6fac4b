use std::time::Duration;

use log::debug;
use reqwest::Url;
use serde::Deserialize;
use velodrive_backend::{RemoteFile, SourceError};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";
const FILES_PATH: &str = "/drive/v3/files";
const LIST_FIELDS: &str = "nextPageToken,files(id,name,size)";
const PAGE_SIZE: &str = "1000";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Deserialize)]
struct DriveFile {
    id: String,
    name: String,
    #[serde(default)]
    size: Option<String>,
}

#[derive(Deserialize)]
struct FileMetadata {
    #[serde(default)]
    size: Option<String>,
}

// Drive encodes int64 fields as JSON strings.
fn parse_size(size: Option<&str>) -> Option<u64> {
    size.and_then(|value| value.trim().parse().ok())
}

fn response_snippet(body: &str, max_chars: usize) -> String {
    let snippet: String = body.chars().take(max_chars).collect();
    if snippet.is_empty() {
        String::new()
    } else {
        format!(": {snippet}")
    }
}

/// Minimal Google Drive v3 client authenticated with a static API key.
#[derive(Debug, Clone)]
pub struct DriveClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl DriveClient {
    /// Build a client. `application_name` is prepended to the user agent.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        api_key: &str,
        application_name: Option<&str>,
        read_timeout: Duration,
    ) -> Result<Self, SourceError> {
        let agent = format!("velodrive/{}", env!("CARGO_PKG_VERSION"));
        let user_agent = match application_name.map(str::trim) {
            Some(name) if !name.is_empty() => format!("{name} {agent}"),
            _ => agent,
        };

        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(read_timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|error| SourceError::config("http client", error.to_string()))?;

        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.to_string(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, SourceError> {
        let mut url = Url::parse(&format!("{}{path}", self.base_url))
            .map_err(|error| SourceError::config("base url", error.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            for (name, value) in params {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }

    async fn get(&self, operation: &'static str, url: Url) -> Result<reqwest::Response, SourceError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|error| SourceError::network_request_from(operation, error))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_snippet = response
                .text()
                .await
                .ok()
                .map(|body| response_snippet(&body, 160))
                .unwrap_or_default();
            return Err(SourceError::network_request(
                operation,
                format!("HTTP {status}{body_snippet}"),
            ));
        }

        Ok(response)
    }

    /// List every file matching a Drive search expression, following
    /// pagination until the listing is exhausted.
    ///
    /// # Errors
    /// Returns an error if any page request fails or cannot be parsed.
    pub async fn list_files(&self, query: &str) -> Result<Vec<RemoteFile>, SourceError> {
        const OPERATION: &str = "list release files";

        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = vec![
                ("q", query),
                ("fields", LIST_FIELDS),
                ("pageSize", PAGE_SIZE),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ];
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }

            let url = self.url(FILES_PATH, &params)?;
            let page: FileList = self
                .get(OPERATION, url)
                .await?
                .json()
                .await
                .map_err(|error| SourceError::network_parse_from(OPERATION, error))?;

            debug!("Drive listing page returned {} files", page.files.len());
            files.extend(page.files.into_iter().map(|file| RemoteFile {
                size: parse_size(file.size.as_deref()),
                name: file.name,
                remote_id: file.id,
            }));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(files)
    }

    /// Size in bytes Drive reports for a file, if any.
    ///
    /// # Errors
    /// Returns an error if the metadata request fails or cannot be parsed.
    pub async fn file_size(&self, file_id: &str) -> Result<Option<u64>, SourceError> {
        const OPERATION: &str = "fetch file metadata";

        let url = self.url(
            &format!("{FILES_PATH}/{file_id}"),
            &[("fields", "size"), ("supportsAllDrives", "true")],
        )?;
        let metadata: FileMetadata = self
            .get(OPERATION, url)
            .await?
            .json()
            .await
            .map_err(|error| SourceError::network_parse_from(OPERATION, error))?;

        Ok(parse_size(metadata.size.as_deref()))
    }

    /// Start a download of the file contents. The body is left unread for
    /// the caller to stream.
    ///
    /// # Errors
    /// Returns an error if the request fails or Drive answers with a
    /// non-success status.
    pub async fn open_media(&self, file_id: &str) -> Result<reqwest::Response, SourceError> {
        let url = self.url(
            &format!("{FILES_PATH}/{file_id}"),
            &[("alt", "media"), ("supportsAllDrives", "true")],
        )?;
        self.get("download file content", url).await
    }
}
