//! Shared fakes and helpers for the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};

use tubesync::store::{Channel, DirectoryStore, NewVideo, SqliteStore, Subscription, TimelineVideo};
use tubesync::web::middleware::JwtClaims;
use tubesync::youtube::{FeedSource, SubscriptionPage, SubscriptionSource};
use tubesync::{Database, Result, TubesyncError};

/// Secret shared by the test router and the token helper.
pub const TEST_SECRET: &str = "test-secret-key-for-testing-only";

/// A remote subscription record for `channel_id`.
pub fn sub(channel_id: &str) -> Subscription {
    Subscription {
        id: format!("sub-{channel_id}"),
        title: format!("Channel {channel_id}"),
        thumbnail: format!("https://yt3.example/{channel_id}.jpg"),
        channel_id: channel_id.to_string(),
        description: String::new(),
    }
}

/// Remote records for several channels.
pub fn subs(channel_ids: &[&str]) -> Vec<Subscription> {
    channel_ids.iter().map(|id| sub(id)).collect()
}

/// Owned channel ids.
pub fn ids(channel_ids: &[&str]) -> Vec<String> {
    channel_ids.iter().map(|id| id.to_string()).collect()
}

/// A fresh in-memory store.
pub async fn memory_store() -> Arc<SqliteStore> {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    Arc::new(SqliteStore::new(db))
}

/// A signed bearer token for `sub`, valid for an hour.
pub fn token(secret: &str, sub: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = JwtClaims {
        sub: sub.to_string(),
        exp: (now + 3600) as u64,
        iat: Some(now as u64),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to sign token")
}

/// A video in `channel_id`'s feed.
pub fn video(id: &str, channel_id: &str) -> NewVideo {
    NewVideo::new(id, channel_id, format!("Video {id}"))
}

// ============================================================================
// Subscription source
// ============================================================================

/// Serves a fixed list of pages chained by `page-N` tokens.
#[derive(Default)]
pub struct FakeSubscriptionSource {
    pages: Vec<Vec<Subscription>>,
    fail_at: Option<usize>,
    calls: Mutex<Vec<(String, Option<String>)>>,
}

impl FakeSubscriptionSource {
    pub fn new(pages: Vec<Vec<Subscription>>) -> Self {
        Self {
            pages,
            ..Default::default()
        }
    }

    /// A single page holding `items`.
    pub fn single(items: Vec<Subscription>) -> Self {
        Self::new(vec![items])
    }

    /// Fail when page `index` (0-based) is requested.
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// Number of page requests made.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Page tokens requested, in order.
    pub fn page_tokens(&self) -> Vec<Option<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, page)| page.clone())
            .collect()
    }

    /// Provider tokens presented, in order.
    pub fn provider_tokens(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(token, _)| token.clone())
            .collect()
    }
}

#[async_trait]
impl SubscriptionSource for FakeSubscriptionSource {
    async fn fetch_page(
        &self,
        provider_token: &str,
        page_token: Option<&str>,
    ) -> Result<SubscriptionPage> {
        self.calls
            .lock()
            .unwrap()
            .push((provider_token.to_string(), page_token.map(str::to_string)));

        let index = match page_token {
            None => 0,
            Some(token) => token
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| TubesyncError::Upstream(format!("unknown page token {token}")))?,
        };

        if self.fail_at == Some(index) {
            return Err(TubesyncError::Upstream(
                "subscription list returned HTTP 500 Internal Server Error".to_string(),
            ));
        }

        let items = self.pages.get(index).cloned().unwrap_or_default();
        let next_page_token = (index + 1 < self.pages.len()).then(|| format!("page-{}", index + 1));
        Ok(SubscriptionPage {
            items,
            next_page_token,
        })
    }
}

// ============================================================================
// Feed source
// ============================================================================

/// Serves canned videos per channel and records when each fetch started.
#[derive(Default)]
pub struct FakeFeedSource {
    videos: HashMap<String, Vec<NewVideo>>,
    failing: HashSet<String>,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl FakeFeedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_videos(mut self, channel_id: &str, videos: Vec<NewVideo>) -> Self {
        self.videos.insert(channel_id.to_string(), videos);
        self
    }

    pub fn failing(mut self, channel_id: &str) -> Self {
        self.failing.insert(channel_id.to_string());
        self
    }

    /// Channels fetched, in start order.
    pub fn fetched(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Fetch start instants, in start order.
    pub fn started_at(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }
}

#[async_trait]
impl FeedSource for FakeFeedSource {
    async fn fetch(&self, channel_id: &str) -> Result<Vec<NewVideo>> {
        self.calls
            .lock()
            .unwrap()
            .push((channel_id.to_string(), Instant::now()));

        if self.failing.contains(channel_id) {
            return Err(TubesyncError::Feed(format!(
                "failed to fetch feed for {channel_id}: connection reset"
            )));
        }
        Ok(self.videos.get(channel_id).cloned().unwrap_or_default())
    }
}

// ============================================================================
// Counting store
// ============================================================================

/// Wraps a [`SqliteStore`], counting calls and optionally failing one operation.
pub struct CountingStore {
    inner: Arc<SqliteStore>,
    calls: AtomicUsize,
    fail_on: Option<&'static str>,
}

impl CountingStore {
    pub fn new(inner: Arc<SqliteStore>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            fail_on: None,
        }
    }

    /// Fail the named operation with a database error.
    pub fn failing_on(mut self, op: &'static str) -> Self {
        self.fail_on = Some(op);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self, op: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on == Some(op) {
            return Err(TubesyncError::Database(format!("{op} failed")));
        }
        Ok(())
    }
}

#[async_trait]
impl DirectoryStore for CountingStore {
    async fn get_channels(&self, ids: &[String]) -> Result<Vec<Channel>> {
        self.enter("get_channels")?;
        self.inner.get_channels(ids).await
    }

    async fn upsert_channels(&self, channels: &[Channel]) -> Result<()> {
        self.enter("upsert_channels")?;
        self.inner.upsert_channels(channels).await
    }

    async fn list_subscribed_channel_ids(&self, user_id: &str) -> Result<Vec<String>> {
        self.enter("list_subscribed_channel_ids")?;
        self.inner.list_subscribed_channel_ids(user_id).await
    }

    async fn delete_subscriptions(&self, user_id: &str, channel_ids: &[String]) -> Result<u64> {
        self.enter("delete_subscriptions")?;
        self.inner.delete_subscriptions(user_id, channel_ids).await
    }

    async fn insert_subscriptions(&self, user_id: &str, channel_ids: &[String]) -> Result<u64> {
        self.enter("insert_subscriptions")?;
        self.inner.insert_subscriptions(user_id, channel_ids).await
    }

    async fn upsert_videos(&self, videos: &[NewVideo]) -> Result<u64> {
        self.enter("upsert_videos")?;
        self.inner.upsert_videos(videos).await
    }

    async fn list_channels_for_user(&self, user_id: &str) -> Result<Vec<Channel>> {
        self.enter("list_channels_for_user")?;
        self.inner.list_channels_for_user(user_id).await
    }

    async fn list_timeline(
        &self,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TimelineVideo>> {
        self.enter("list_timeline")?;
        self.inner.list_timeline(user_id, limit, offset).await
    }

    async fn count_timeline(&self, user_id: &str) -> Result<i64> {
        self.enter("count_timeline")?;
        self.inner.count_timeline(user_id).await
    }
}
