//! Database schema and migrations for tubesync.
//!
//! Migrations run in order on open; `schema_version` records the ones applied.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: channels, subscriptions and videos
    r#"
-- Followed channels mirrored from the platform
CREATE TABLE channels (
    id              TEXT PRIMARY KEY,
    title           TEXT NOT NULL,
    handle          TEXT,
    thumbnail_url   TEXT,
    last_synced_at  TEXT,                 -- RFC3339, NULL = never synced
    created_at      TEXT NOT NULL DEFAULT (datetime('now'))
);

-- One row per (user, channel) follow
CREATE TABLE subscriptions (
    user_id     TEXT NOT NULL,
    channel_id  TEXT NOT NULL REFERENCES channels(id) ON DELETE CASCADE,
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (user_id, channel_id)
);

CREATE INDEX idx_subscriptions_channel ON subscriptions(channel_id);

-- Videos ingested from channel feeds
CREATE TABLE videos (
    id              TEXT PRIMARY KEY,
    channel_id      TEXT NOT NULL REFERENCES channels(id) ON DELETE CASCADE,
    title           TEXT NOT NULL,
    description     TEXT NOT NULL DEFAULT '',
    published_at    TEXT,
    thumbnail_url   TEXT NOT NULL DEFAULT '',
    video_url       TEXT NOT NULL,
    fetched_at      TEXT NOT NULL
);

CREATE INDEX idx_videos_channel_published ON videos(channel_id, published_at);
"#,
];
