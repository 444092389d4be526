//! Directory store repositories for tubesync.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite};

use super::types::{Channel, NewVideo, TimelineVideo, Video};
use crate::datetime::{parse_datetime, to_db};
use crate::db::{DbPool, MAX_BIND_PARAMS};
use crate::Result;

/// Columns bound per channel row.
const CHANNEL_COLUMNS: usize = 5;
/// Columns bound per subscription row.
const SUBSCRIPTION_COLUMNS: usize = 2;
/// Columns bound per video row.
const VIDEO_COLUMNS: usize = 8;

/// Row type for channel from database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ChannelRow {
    id: String,
    title: String,
    handle: Option<String>,
    thumbnail_url: Option<String>,
    last_synced_at: Option<String>,
}

impl From<ChannelRow> for Channel {
    fn from(row: ChannelRow) -> Self {
        Channel {
            id: row.id,
            title: row.title,
            handle: row.handle,
            thumbnail_url: row.thumbnail_url,
            last_synced_at: row.last_synced_at.and_then(|s| parse_datetime(&s)),
        }
    }
}

/// Row type for a video joined with its channel title.
#[derive(Debug, Clone, sqlx::FromRow)]
struct VideoRow {
    id: String,
    channel_id: String,
    title: String,
    description: String,
    published_at: Option<String>,
    thumbnail_url: String,
    video_url: String,
    fetched_at: String,
    channel_title: String,
}

impl From<VideoRow> for TimelineVideo {
    fn from(row: VideoRow) -> Self {
        TimelineVideo {
            video: Video {
                id: row.id,
                channel_id: row.channel_id,
                title: row.title,
                description: row.description,
                published_at: row.published_at.and_then(|s| parse_datetime(&s)),
                thumbnail_url: row.thumbnail_url,
                video_url: row.video_url,
                fetched_at: parse_datetime(&row.fetched_at).unwrap_or_else(Utc::now),
            },
            channel_title: row.channel_title,
        }
    }
}

/// Repository for channel operations.
pub struct ChannelRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> ChannelRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Get a channel by ID.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Channel>> {
        let row = sqlx::query_as::<_, ChannelRow>(
            "SELECT id, title, handle, thumbnail_url, last_synced_at FROM channels WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Channel::from))
    }

    /// Get every channel whose ID is in `ids`. Unknown IDs are skipped.
    pub async fn get_many(&self, ids: &[String]) -> Result<Vec<Channel>> {
        let mut channels = Vec::with_capacity(ids.len());

        for chunk in ids.chunks(MAX_BIND_PARAMS) {
            let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
                "SELECT id, title, handle, thumbnail_url, last_synced_at FROM channels WHERE id IN (",
            );
            let mut separated = query.separated(", ");
            for id in chunk {
                separated.push_bind(id);
            }
            separated.push_unseparated(")");

            let rows = query
                .build_query_as::<ChannelRow>()
                .fetch_all(self.pool)
                .await?;
            channels.extend(rows.into_iter().map(Channel::from));
        }

        Ok(channels)
    }

    /// Insert or update channels keyed by ID.
    ///
    /// `last_synced_at` never moves backwards, and a missing handle or
    /// thumbnail keeps the stored one. IDs must be unique within `channels`.
    pub async fn upsert_many(&self, channels: &[Channel]) -> Result<()> {
        if channels.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        for chunk in channels.chunks(MAX_BIND_PARAMS / CHANNEL_COLUMNS) {
            let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
                "INSERT INTO channels (id, title, handle, thumbnail_url, last_synced_at) ",
            );
            query.push_values(chunk, |mut b, channel| {
                b.push_bind(&channel.id)
                    .push_bind(&channel.title)
                    .push_bind(&channel.handle)
                    .push_bind(&channel.thumbnail_url)
                    .push_bind(channel.last_synced_at.as_ref().map(to_db));
            });
            query.push(
                r#"
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    handle = COALESCE(excluded.handle, channels.handle),
                    thumbnail_url = COALESCE(excluded.thumbnail_url, channels.thumbnail_url),
                    last_synced_at = MAX(
                        COALESCE(channels.last_synced_at, excluded.last_synced_at),
                        COALESCE(excluded.last_synced_at, channels.last_synced_at)
                    )
                "#,
            );

            query.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// List the channels a user follows, ordered by title.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Channel>> {
        let rows = sqlx::query_as::<_, ChannelRow>(
            r#"
            SELECT c.id, c.title, c.handle, c.thumbnail_url, c.last_synced_at
            FROM channels c
            INNER JOIN subscriptions s ON s.channel_id = c.id
            WHERE s.user_id = ?
            ORDER BY c.title COLLATE NOCASE, c.id
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Channel::from).collect())
    }

    /// Count all channels.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM channels")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

/// Repository for user/channel follow operations.
pub struct SubscriptionRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> SubscriptionRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Channel IDs the user follows.
    pub async fn list_channel_ids(&self, user_id: &str) -> Result<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT channel_id FROM subscriptions WHERE user_id = ? ORDER BY channel_id",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(ids)
    }

    /// Remove follows for the given channels. Returns the number removed.
    pub async fn delete_many(&self, user_id: &str, channel_ids: &[String]) -> Result<u64> {
        if channel_ids.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut removed = 0;

        for chunk in channel_ids.chunks(MAX_BIND_PARAMS - 1) {
            let mut query: QueryBuilder<Sqlite> =
                QueryBuilder::new("DELETE FROM subscriptions WHERE user_id = ");
            query.push_bind(user_id);
            query.push(" AND channel_id IN (");
            let mut separated = query.separated(", ");
            for id in chunk {
                separated.push_bind(id);
            }
            separated.push_unseparated(")");

            removed += query.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;
        Ok(removed)
    }

    /// Add follows, ignoring ones that already exist. Returns the number added.
    pub async fn insert_many(&self, user_id: &str, channel_ids: &[String]) -> Result<u64> {
        if channel_ids.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut added = 0;

        for chunk in channel_ids.chunks(MAX_BIND_PARAMS / SUBSCRIPTION_COLUMNS) {
            let mut query: QueryBuilder<Sqlite> =
                QueryBuilder::new("INSERT INTO subscriptions (user_id, channel_id) ");
            query.push_values(chunk, |mut b, channel_id| {
                b.push_bind(user_id).push_bind(channel_id);
            });
            query.push(" ON CONFLICT(user_id, channel_id) DO NOTHING");

            added += query.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;
        Ok(added)
    }

    /// Count all follows across users.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

/// Repository for video operations.
pub struct VideoRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> VideoRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert or update videos keyed by ID. Returns the number of rows written.
    ///
    /// Duplicate IDs within `videos` collapse to the first occurrence.
    pub async fn upsert_many(&self, videos: &[NewVideo], fetched_at: DateTime<Utc>) -> Result<u64> {
        let mut seen = std::collections::HashSet::new();
        let unique: Vec<&NewVideo> = videos.iter().filter(|v| seen.insert(&v.id)).collect();
        if unique.is_empty() {
            return Ok(0);
        }

        let fetched_at = to_db(&fetched_at);
        let mut tx = self.pool.begin().await?;
        let mut written = 0;

        for chunk in unique.chunks(MAX_BIND_PARAMS / VIDEO_COLUMNS) {
            let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
                "INSERT INTO videos (id, channel_id, title, description, published_at, \
                 thumbnail_url, video_url, fetched_at) ",
            );
            query.push_values(chunk, |mut b, video| {
                b.push_bind(&video.id)
                    .push_bind(&video.channel_id)
                    .push_bind(&video.title)
                    .push_bind(&video.description)
                    .push_bind(video.published_at.as_ref().map(to_db))
                    .push_bind(&video.thumbnail_url)
                    .push_bind(&video.video_url)
                    .push_bind(&fetched_at);
            });
            query.push(
                r#"
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    description = excluded.description,
                    published_at = COALESCE(excluded.published_at, videos.published_at),
                    thumbnail_url = excluded.thumbnail_url,
                    video_url = excluded.video_url,
                    fetched_at = excluded.fetched_at
                "#,
            );

            written += query.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;
        Ok(written)
    }

    /// Get a video by ID.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<TimelineVideo>> {
        let row = sqlx::query_as::<_, VideoRow>(
            r#"
            SELECT v.id, v.channel_id, v.title, v.description, v.published_at,
                   v.thumbnail_url, v.video_url, v.fetched_at, c.title AS channel_title
            FROM videos v
            INNER JOIN channels c ON c.id = v.channel_id
            WHERE v.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(TimelineVideo::from))
    }

    /// Newest videos across the channels a user follows.
    pub async fn list_timeline(
        &self,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TimelineVideo>> {
        let rows = sqlx::query_as::<_, VideoRow>(
            r#"
            SELECT v.id, v.channel_id, v.title, v.description, v.published_at,
                   v.thumbnail_url, v.video_url, v.fetched_at, c.title AS channel_title
            FROM videos v
            INNER JOIN subscriptions s ON s.channel_id = v.channel_id
            INNER JOIN channels c ON c.id = v.channel_id
            WHERE s.user_id = ?
            ORDER BY v.published_at IS NULL, v.published_at DESC, v.id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(TimelineVideo::from).collect())
    }

    /// Count timeline videos for a user.
    pub async fn count_timeline(&self, user_id: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM videos v
            INNER JOIN subscriptions s ON s.channel_id = v.channel_id
            WHERE s.user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// Count videos belonging to a channel.
    pub async fn count_by_channel(&self, channel_id: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM videos WHERE channel_id = ?")
            .bind(channel_id)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
