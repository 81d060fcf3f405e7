//! Snapshot sync against an HTTP stand-in for the CMS, and the runtime
//! reading what the sync wrote.

mod common;

use common::{CmsServer, config_for, fixture, query_param};
use folio_cms::client::ContentClient;
use folio_cms::snapshot::{Snapshot, SnapshotLocation};
use folio_cms::source::{PostQuery, RemoteSource};
use folio_cms::sync::{SyncOutcome, sync_snapshot};
use folio_cms::types::Provenance;
use tempfile::TempDir;

fn paged_route(target: &str) -> (u16, String) {
    match query_param(target, "page") {
        Some("1") => (200, fixture("posts_page1.json")),
        Some("2") => (200, fixture("posts_page2.json")),
        _ => (404, "{}".to_string()),
    }
}

fn remote_for(server: &CmsServer, tmp: &TempDir) -> RemoteSource {
    let config = config_for(server, &tmp.path().join("unused.json"));
    RemoteSource::from_config(&config.cms).unwrap()
}

async fn read_snapshot(path: &std::path::Path) -> Snapshot<serde_json::Value> {
    SnapshotLocation::File(path.to_path_buf())
        .load(&reqwest::Client::new())
        .await
        .unwrap()
}

#[tokio::test]
async fn sync_pages_until_last_page() {
    let server = CmsServer::start(paged_route);
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("public/data/cmsPosts.json");

    let report = sync_snapshot(&remote_for(&server, &tmp), &path).await.unwrap();
    assert_eq!(report.outcome, SyncOutcome::Written);
    assert_eq!(report.posts, 3);
    assert_eq!(report.pages, 2);
    assert!(report.error.is_none());

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    for target in &requests {
        assert_eq!(query_param(target, "limit"), Some("100"));
        assert_eq!(query_param(target, "depth"), Some("2"));
        assert_eq!(query_param(target, "where[_status][equals]"), Some("published"));
    }

    let snapshot = read_snapshot(&path).await;
    assert_eq!(snapshot.version, 1);
    assert_eq!(snapshot.source, "cms");
    assert_eq!(snapshot.posts.len(), 3);
    assert_eq!(snapshot.last_updated, report.last_updated);
    // documents are stored as the CMS sent them
    assert_eq!(snapshot.posts[1]["heroImage"], 17);
}

#[tokio::test]
async fn failed_page_keeps_what_was_collected() {
    let server = CmsServer::start(|target| match query_param(target, "page") {
        Some("1") => (200, fixture("posts_page1.json")),
        _ => (502, "bad gateway".to_string()),
    });
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("cmsPosts.json");

    let report = sync_snapshot(&remote_for(&server, &tmp), &path).await.unwrap();
    assert_eq!(report.outcome, SyncOutcome::Written);
    assert_eq!(report.posts, 2);
    assert_eq!(report.pages, 1);
    assert!(report.error.as_deref().unwrap().contains("502"));
    assert_eq!(read_snapshot(&path).await.posts.len(), 2);
}

#[tokio::test]
async fn nothing_fetched_writes_empty_snapshot() {
    let server = CmsServer::start(|_| (500, "{}".to_string()));
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("cmsPosts.json");

    let report = sync_snapshot(&remote_for(&server, &tmp), &path).await.unwrap();
    assert_eq!(report.outcome, SyncOutcome::WroteEmpty);

    let snapshot = read_snapshot(&path).await;
    assert!(snapshot.is_empty());
    assert_eq!(snapshot.last_updated, None);
}

#[tokio::test]
async fn nothing_fetched_keeps_existing_snapshot() {
    let server = CmsServer::start(|_| (500, "{}".to_string()));
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("cmsPosts.json");
    let existing = r#"{"posts": [{"id": 1, "title": "Kept", "slug": "kept"}], "version": 1}"#;
    std::fs::write(&path, existing).unwrap();

    let report = sync_snapshot(&remote_for(&server, &tmp), &path).await.unwrap();
    assert_eq!(report.outcome, SyncOutcome::KeptExisting);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), existing);
}

#[tokio::test]
async fn runtime_reads_synced_snapshot() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("cmsPosts.json");
    {
        let server = CmsServer::start(paged_route);
        sync_snapshot(&remote_for(&server, &tmp), &path).await.unwrap();
    }

    // CMS now down
    let down = CmsServer::start(|_| (503, "{}".to_string()));
    let client = ContentClient::from_config(&config_for(&down, &path)).unwrap();

    let page = client.fetch_posts(&PostQuery::default()).await;
    assert_eq!(page.posts.len(), 3);
    assert!(page.posts.iter().all(|p| p.provenance == Provenance::Cache));
    let slugs: Vec<&str> = page.posts.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(
        slugs,
        [
            "shipping-models",
            "edge-inference",
            "why-agentic-ai-performance-engine"
        ]
    );
}

#[tokio::test]
async fn empty_synced_snapshot_falls_through_to_bundled() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("cmsPosts.json");
    let down = CmsServer::start(|_| (500, "{}".to_string()));
    sync_snapshot(&remote_for(&down, &tmp), &path).await.unwrap();

    let client = ContentClient::from_config(&config_for(&down, &path)).unwrap();
    let page = client.fetch_posts(&PostQuery::default()).await;
    assert!(!page.posts.is_empty());
    assert!(page.posts.iter().all(|p| p.provenance == Provenance::Static));
}
