//! Directory store for tubesync.
//!
//! The sync pipeline talks to storage only through [`DirectoryStore`], so it
//! can run against SQLite in production and against wrappers or fakes in tests.

mod repository;
mod types;

pub use repository::{ChannelRepository, SubscriptionRepository, VideoRepository};
pub use types::{
    truncate_chars, watch_url, Channel, NewVideo, Subscription, TimelineVideo, Video,
    MAX_DESCRIPTION_LENGTH, WATCH_URL_BASE,
};

use async_trait::async_trait;
use chrono::Utc;

use crate::db::Database;
use crate::Result;

/// Batched CRUD over channels, follows and videos.
///
/// Writes are idempotent upserts that are safe to retry and to race against
/// another sync for the same user.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Load the stored channels among `ids` in one lookup.
    async fn get_channels(&self, ids: &[String]) -> Result<Vec<Channel>>;

    /// Insert or update channels keyed by ID.
    async fn upsert_channels(&self, channels: &[Channel]) -> Result<()>;

    /// Channel IDs the user currently follows.
    async fn list_subscribed_channel_ids(&self, user_id: &str) -> Result<Vec<String>>;

    /// Remove the user's follows for `channel_ids`.
    async fn delete_subscriptions(&self, user_id: &str, channel_ids: &[String]) -> Result<u64>;

    /// Add follows for `channel_ids`, ignoring existing ones.
    async fn insert_subscriptions(&self, user_id: &str, channel_ids: &[String]) -> Result<u64>;

    /// Insert or update videos keyed by ID.
    async fn upsert_videos(&self, videos: &[NewVideo]) -> Result<u64>;

    /// Channels the user follows, ordered by title.
    async fn list_channels_for_user(&self, user_id: &str) -> Result<Vec<Channel>>;

    /// Newest videos across the user's follows.
    async fn list_timeline(&self, user_id: &str, limit: i64, offset: i64)
        -> Result<Vec<TimelineVideo>>;

    /// Number of videos in the user's timeline.
    async fn count_timeline(&self, user_id: &str) -> Result<i64>;
}

/// SQLite-backed directory store.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Create a store over an open database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// The underlying database.
    pub fn db(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl DirectoryStore for SqliteStore {
    async fn get_channels(&self, ids: &[String]) -> Result<Vec<Channel>> {
        ChannelRepository::new(self.db.pool()).get_many(ids).await
    }

    async fn upsert_channels(&self, channels: &[Channel]) -> Result<()> {
        ChannelRepository::new(self.db.pool())
            .upsert_many(channels)
            .await
    }

    async fn list_subscribed_channel_ids(&self, user_id: &str) -> Result<Vec<String>> {
        SubscriptionRepository::new(self.db.pool())
            .list_channel_ids(user_id)
            .await
    }

    async fn delete_subscriptions(&self, user_id: &str, channel_ids: &[String]) -> Result<u64> {
        SubscriptionRepository::new(self.db.pool())
            .delete_many(user_id, channel_ids)
            .await
    }

    async fn insert_subscriptions(&self, user_id: &str, channel_ids: &[String]) -> Result<u64> {
        SubscriptionRepository::new(self.db.pool())
            .insert_many(user_id, channel_ids)
            .await
    }

    async fn upsert_videos(&self, videos: &[NewVideo]) -> Result<u64> {
        VideoRepository::new(self.db.pool())
            .upsert_many(videos, Utc::now())
            .await
    }

    async fn list_channels_for_user(&self, user_id: &str) -> Result<Vec<Channel>> {
        ChannelRepository::new(self.db.pool())
            .list_for_user(user_id)
            .await
    }

    async fn list_timeline(
        &self,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TimelineVideo>> {
        VideoRepository::new(self.db.pool())
            .list_timeline(user_id, limit, offset)
            .await
    }

    async fn count_timeline(&self, user_id: &str) -> Result<i64> {
        VideoRepository::new(self.db.pool())
            .count_timeline(user_id)
            .await
    }
}
