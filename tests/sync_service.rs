//! Sync service integration tests.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{ids, memory_store, sub, subs, video, CountingStore, FakeFeedSource, FakeSubscriptionSource};
use tubesync::store::{DirectoryStore, VideoRepository};
use tubesync::sync::SyncService;
use tubesync::youtube::{FeedSource, SubscriptionSource};
use tubesync::{
    BatchScheduler, FeedRefresher, ImportChannel, RefreshWorker, SqliteStore, StalenessPolicy,
    TubesyncError,
};

struct Harness {
    service: SyncService,
    store: Arc<SqliteStore>,
    source: Arc<FakeSubscriptionSource>,
    feeds: Arc<FakeFeedSource>,
}

async fn harness(source: FakeSubscriptionSource, feeds: FakeFeedSource) -> Harness {
    let store = memory_store().await;
    let source = Arc::new(source);
    let feeds = Arc::new(feeds);

    let refresher = FeedRefresher::new(
        store.clone(),
        feeds.clone() as Arc<dyn FeedSource>,
        BatchScheduler::new(4, Duration::from_millis(5)),
    );
    let (worker, queue) = RefreshWorker::new(refresher);
    worker.spawn();

    let service = SyncService::new(
        store.clone(),
        source.clone() as Arc<dyn SubscriptionSource>,
        queue,
        StalenessPolicy::default(),
        10,
    );

    Harness {
        service,
        store,
        source,
        feeds,
    }
}

#[tokio::test]
async fn test_sync_walks_every_page() {
    let h = harness(
        FakeSubscriptionSource::new(vec![subs(&["A", "B"]), subs(&["C"]), subs(&["D"])]),
        FakeFeedSource::new(),
    )
    .await;

    let subscriptions = h.service.sync("user-1", "provider-token").await.unwrap();

    assert_eq!(
        subscriptions
            .iter()
            .map(|s| s.channel_id.as_str())
            .collect::<Vec<_>>(),
        vec!["A", "B", "C", "D"]
    );
    assert_eq!(
        h.source.page_tokens(),
        vec![None, Some("page-1".to_string()), Some("page-2".to_string())]
    );
    assert!(h
        .source
        .provider_tokens()
        .iter()
        .all(|t| t == "provider-token"));
    assert_eq!(
        h.store.list_subscribed_channel_ids("user-1").await.unwrap(),
        ids(&["A", "B", "C", "D"])
    );
}

#[tokio::test]
async fn test_page_failure_aborts_before_any_store_call() {
    let store = Arc::new(CountingStore::new(memory_store().await));
    let source = Arc::new(
        FakeSubscriptionSource::new(vec![subs(&["A"]), subs(&["B"]), subs(&["C"])]).failing_at(1),
    );
    let refresher = FeedRefresher::new(
        store.clone(),
        Arc::new(FakeFeedSource::new()),
        BatchScheduler::new(4, Duration::from_millis(5)),
    );
    let (worker, queue) = RefreshWorker::new(refresher);
    worker.spawn();
    let service = SyncService::new(
        store.clone(),
        source.clone(),
        queue,
        StalenessPolicy::default(),
        10,
    );

    let result = service.sync("user-1", "provider-token").await;

    assert!(matches!(result, Err(TubesyncError::Upstream(_))));
    assert_eq!(source.call_count(), 2);
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_page_ceiling_is_an_upstream_error() {
    let pages: Vec<_> = (0..20).map(|i| vec![sub(&format!("UC{i}"))]).collect();
    let store = memory_store().await;
    let refresher = FeedRefresher::new(
        store.clone(),
        Arc::new(FakeFeedSource::new()),
        BatchScheduler::new(4, Duration::from_millis(5)),
    );
    let (worker, queue) = RefreshWorker::new(refresher);
    worker.spawn();
    let source = Arc::new(FakeSubscriptionSource::new(pages));
    let service = SyncService::new(store.clone(), source.clone(), queue, StalenessPolicy::default(), 5);

    let result = service.sync("user-1", "provider-token").await;

    assert!(matches!(result, Err(TubesyncError::Upstream(msg)) if msg.contains("5 pages")));
    assert_eq!(source.call_count(), 5);
    assert!(store
        .list_subscribed_channel_ids("user-1")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_background_refresh_stores_videos() {
    let h = harness(
        FakeSubscriptionSource::single(subs(&["A", "B"])),
        FakeFeedSource::new()
            .with_videos("A", vec![video("a1", "A"), video("a2", "A")])
            .with_videos("B", vec![video("b1", "B")]),
    )
    .await;

    let outcome = h
        .service
        .sync_with_handle("user-1", "provider-token")
        .await
        .unwrap();
    assert_eq!(outcome.due, ids(&["A", "B"]));

    let report = outcome.refresh.unwrap().await.unwrap();
    assert_eq!(report.succeeded, 2);

    assert_eq!(h.store.count_timeline("user-1").await.unwrap(), 3);
    let timeline = h.store.list_timeline("user-1", 10, 0).await.unwrap();
    assert!(timeline
        .iter()
        .any(|v| v.video.id == "b1" && v.channel_title == "Channel B"));
}

#[tokio::test]
async fn test_refresh_failures_are_not_surfaced() {
    let h = harness(
        FakeSubscriptionSource::single(subs(&["A", "B"])),
        FakeFeedSource::new()
            .failing("A")
            .with_videos("B", vec![video("b1", "B")]),
    )
    .await;

    let outcome = h
        .service
        .sync_with_handle("user-1", "provider-token")
        .await
        .unwrap();
    assert_eq!(outcome.subscriptions.len(), 2);

    let report = outcome.refresh.unwrap().await.unwrap();
    assert_eq!(report.failed, 1);
    assert_eq!(report.succeeded, 1);

    let videos = VideoRepository::new(h.store.db().pool());
    assert_eq!(videos.count_by_channel("B").await.unwrap(), 1);

    // The failed channel still counts as synced today
    let again = h
        .service
        .sync_with_handle("user-1", "provider-token")
        .await
        .unwrap();
    assert!(again.due.is_empty());
    assert_eq!(h.feeds.fetched().len(), 2);
}

#[tokio::test]
async fn test_empty_remote_list_clears_nothing() {
    let h = harness(FakeSubscriptionSource::single(Vec::new()), FakeFeedSource::new()).await;

    let outcome = h
        .service
        .sync_with_handle("user-1", "provider-token")
        .await
        .unwrap();

    assert!(outcome.subscriptions.is_empty());
    assert!(outcome.refresh.is_none());
}

#[tokio::test]
async fn test_imported_channels_refresh_on_next_sync() {
    let h = harness(
        FakeSubscriptionSource::single(subs(&["A"])),
        FakeFeedSource::new().with_videos("A", vec![video("a1", "A")]),
    )
    .await;

    let count = h
        .service
        .import("user-1", &[ImportChannel::new("A", "Imported A")])
        .await
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(
        h.store.list_subscribed_channel_ids("user-1").await.unwrap(),
        ids(&["A"])
    );

    let outcome = h
        .service
        .sync_with_handle("user-1", "provider-token")
        .await
        .unwrap();
    assert_eq!(outcome.due, ids(&["A"]));
    outcome.refresh.unwrap().await.unwrap();
    assert_eq!(h.store.count_timeline("user-1").await.unwrap(), 1);
}
