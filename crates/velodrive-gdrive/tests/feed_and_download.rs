use mockito::{Matcher, Mock, Server, ServerGuard};
use semver::Version;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use velodrive_gdrive::{
    AssetKind, DriveSourceOptions, FeedRequest, GoogleDriveSource, SourceError, UpdateSource,
};

const LISTING: &str = r#"{
    "files": [
        {"id": "f1", "name": "MyApp-1.2.3-full.nupkg", "size": "10"},
        {"id": "f2", "name": "MyApp-1.2.3-delta.nupkg", "size": "4"},
        {"id": "f3", "name": "readme.txt", "size": "10"}
    ]
}"#;

async fn mock_listing(server: &mut ServerGuard) -> Mock {
    server
        .mock("GET", "/drive/v3/files")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("key".to_string(), "test-key".to_string()),
            Matcher::UrlEncoded(
                "q".to_string(),
                "'folder123' in parents and mimeType != 'application/vnd.google-apps.folder' \
                 and trashed = false and name contains '.nupkg'"
                    .to_string(),
            ),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(LISTING)
        .create_async()
        .await
}

async fn mock_file(server: &mut ServerGuard, id: &str, reported_size: u64, body: &[u8]) {
    let path = format!("/drive/v3/files/{id}");
    server
        .mock("GET", path.as_str())
        .match_query(Matcher::UrlEncoded("fields".to_string(), "size".to_string()))
        .with_status(200)
        .with_body(format!(r#"{{"size":"{reported_size}"}}"#))
        .create_async()
        .await;
    server
        .mock("GET", path.as_str())
        .match_query(Matcher::UrlEncoded("alt".to_string(), "media".to_string()))
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;
}

fn source(server: &ServerGuard) -> Box<dyn UpdateSource> {
    let mut options = DriveSourceOptions::new("folder123", "test-key", "MyApp");
    options.application_name = Some("MyApp".to_string());
    options.base_url = Some(server.url());
    GoogleDriveSource::new(options)
        .expect("options should be valid")
        .into()
}

fn drain(mut rx: mpsc::Receiver<u8>) -> Vec<u8> {
    let mut seen = Vec::new();
    while let Ok(value) = rx.try_recv() {
        seen.push(value);
    }
    seen
}

#[tokio::test]
async fn feed_lists_only_versioned_packages() {
    let mut server = Server::new_async().await;
    let listing = mock_listing(&mut server).await;
    let source = source(&server);

    let feed = source
        .get_release_feed(&FeedRequest::default())
        .await
        .expect("feed should load");

    listing.assert_async().await;
    assert_eq!(feed.len(), 2);
    assert_eq!(feed.assets[0].file_name, "MyApp-1.2.3-full.nupkg");
    assert_eq!(feed.assets[0].version, Version::new(1, 2, 3));
    assert_eq!(feed.assets[0].kind, AssetKind::Full);
    assert_eq!(feed.assets[0].size, 10);
    assert_eq!(feed.assets[1].kind, AssetKind::Delta);
    assert_eq!(feed.assets[1].size, 4);
    assert!(feed.find("readme.txt").is_none());
}

#[tokio::test]
async fn refreshing_the_feed_is_idempotent() {
    let mut server = Server::new_async().await;
    let _listing = mock_listing(&mut server).await;
    let source = source(&server);
    let request = FeedRequest {
        channel: Some("beta".to_string()),
        ..FeedRequest::default()
    };

    let first = source.get_release_feed(&request).await.expect("first refresh");
    let second = source.get_release_feed(&request).await.expect("second refresh");

    assert_eq!(first, second);
}

#[tokio::test]
async fn download_writes_file_and_sets_checksums() {
    let mut server = Server::new_async().await;
    let _listing = mock_listing(&mut server).await;
    mock_file(&mut server, "f1", 10, b"0123456789").await;
    let source = source(&server);

    let feed = source
        .get_release_feed(&FeedRequest::default())
        .await
        .expect("feed should load");
    let mut asset = feed.assets[0].clone();

    let temp = tempfile::tempdir().expect("tempdir should be created");
    let dest = temp.path().join(&asset.file_name);
    let (tx, rx) = mpsc::channel(128);

    source
        .download_release_entry(&mut asset, &dest, &tx, &CancellationToken::new())
        .await
        .expect("download should succeed");

    let contents = std::fs::read(&dest).expect("downloaded file should exist");
    assert_eq!(contents.len(), 10);
    assert_eq!(
        asset.checksum.as_deref(),
        Some("87ACEC17CD9DCD20A716CC2CF67417B71C8A7016")
    );
    assert_eq!(
        asset.sha256.as_deref(),
        Some("84d89877f0d4041efb6bf91a16f0248f2fd573e6af05c19f96bedb9f882f7882")
    );

    let progress = drain(rx);
    assert!(progress.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(progress.last(), Some(&100));
    assert_eq!(progress.iter().filter(|&&p| p == 100).count(), 1);
}

#[tokio::test]
async fn download_lookup_ignores_case() {
    let mut server = Server::new_async().await;
    let _listing = mock_listing(&mut server).await;
    mock_file(&mut server, "f2", 4, b"diff").await;
    let source = source(&server);

    let feed = source
        .get_release_feed(&FeedRequest::default())
        .await
        .expect("feed should load");
    let mut asset = feed.assets[1].clone();
    asset.file_name = asset.file_name.to_uppercase();

    let temp = tempfile::tempdir().expect("tempdir should be created");
    let dest = temp.path().join("delta.nupkg");
    let (tx, _rx) = mpsc::channel(128);

    source
        .download_release_entry(&mut asset, &dest, &tx, &CancellationToken::new())
        .await
        .expect("case-insensitive lookup should succeed");

    assert_eq!(std::fs::read(&dest).expect("file should exist"), b"diff");
}

#[tokio::test]
async fn short_body_is_a_download_failure() {
    let mut server = Server::new_async().await;
    let _listing = mock_listing(&mut server).await;
    mock_file(&mut server, "f1", 20, b"0123456789").await;
    let source = source(&server);

    let feed = source
        .get_release_feed(&FeedRequest::default())
        .await
        .expect("feed should load");
    let mut asset = feed.assets[0].clone();

    let temp = tempfile::tempdir().expect("tempdir should be created");
    let dest = temp.path().join("full.nupkg");
    let (tx, _rx) = mpsc::channel(128);

    let result = source
        .download_release_entry(&mut asset, &dest, &tx, &CancellationToken::new())
        .await;

    assert!(matches!(
        result,
        Err(SourceError::DownloadFailed { ref file_name, .. }) if file_name == "MyApp-1.2.3-full.nupkg"
    ));
    assert!(asset.checksum.is_none());
    assert!(dest.exists(), "partial file is left in place");
}

#[tokio::test]
async fn cancelled_download_reports_cancellation() {
    let mut server = Server::new_async().await;
    let _listing = mock_listing(&mut server).await;
    let source = source(&server);

    let feed = source
        .get_release_feed(&FeedRequest::default())
        .await
        .expect("feed should load");
    let mut asset = feed.assets[0].clone();

    let temp = tempfile::tempdir().expect("tempdir should be created");
    let (tx, _rx) = mpsc::channel(128);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = source
        .download_release_entry(&mut asset, &temp.path().join("x.nupkg"), &tx, &cancel)
        .await;

    assert_eq!(result, Err(SourceError::Cancelled));
    assert!(asset.checksum.is_none());
}

#[tokio::test]
async fn media_request_rejected_is_a_download_failure() {
    let mut server = Server::new_async().await;
    let _listing = mock_listing(&mut server).await;
    server
        .mock("GET", "/drive/v3/files/f1")
        .match_query(Matcher::UrlEncoded("fields".to_string(), "size".to_string()))
        .with_status(200)
        .with_body(r#"{"size":"10"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/drive/v3/files/f1")
        .match_query(Matcher::UrlEncoded("alt".to_string(), "media".to_string()))
        .with_status(404)
        .with_body("File not found: f1")
        .create_async()
        .await;
    let source = source(&server);

    let feed = source
        .get_release_feed(&FeedRequest::default())
        .await
        .expect("feed should load");
    let mut asset = feed.assets[0].clone();

    let temp = tempfile::tempdir().expect("tempdir should be created");
    let dest = temp.path().join("full.nupkg");
    let (tx, _rx) = mpsc::channel(128);

    let result = source
        .download_release_entry(&mut asset, &dest, &tx, &CancellationToken::new())
        .await;

    assert!(matches!(
        result,
        Err(SourceError::DownloadFailed { ref file_name, ref details })
            if file_name == "MyApp-1.2.3-full.nupkg" && details.contains("404")
    ));
    assert!(!dest.exists());
}
