//! Directory store types for tubesync.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Maximum stored video description length in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 5000;

/// Base URL used when a feed entry has no canonical link.
pub const WATCH_URL_BASE: &str = "https://www.youtube.com/watch?v=";

/// A followed channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Channel {
    /// Platform channel ID.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Channel handle, when known.
    pub handle: Option<String>,
    /// Thumbnail URL, when known.
    pub thumbnail_url: Option<String>,
    /// Last feed refresh. `None` means never synced.
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl Channel {
    /// Create a channel that has never been synced.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            handle: None,
            thumbnail_url: None,
            last_synced_at: None,
        }
    }

    /// Set the handle.
    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    /// Set the thumbnail URL.
    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }

    /// Set the last refresh timestamp.
    pub fn with_last_synced_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_synced_at = Some(at);
        self
    }
}

/// A user's view of one followed channel.
///
/// Built from the remote subscription list and returned to callers as the
/// authoritative subscription view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscription {
    /// Platform subscription ID.
    pub id: String,
    /// Channel title.
    pub title: String,
    /// Channel thumbnail URL.
    pub thumbnail: String,
    /// Followed channel ID.
    pub channel_id: String,
    /// Channel description.
    pub description: String,
}

impl Subscription {
    /// The channel row this subscription refers to.
    pub fn to_channel(&self) -> Channel {
        let channel = Channel::new(&self.channel_id, &self.title).with_handle(&self.channel_id);
        if self.thumbnail.is_empty() {
            channel
        } else {
            channel.with_thumbnail(&self.thumbnail)
        }
    }
}

/// A video parsed from a channel feed, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVideo {
    /// Platform video ID.
    pub id: String,
    /// Owning channel ID.
    pub channel_id: String,
    /// Title.
    pub title: String,
    /// Description, at most `MAX_DESCRIPTION_LENGTH` characters.
    pub description: String,
    /// Publication time.
    pub published_at: Option<DateTime<Utc>>,
    /// Thumbnail URL, empty when the feed has none.
    pub thumbnail_url: String,
    /// Canonical watch URL.
    pub video_url: String,
}

impl NewVideo {
    /// Create a video with the fallback watch URL and no optional fields.
    pub fn new(
        id: impl Into<String>,
        channel_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        let id = id.into();
        let video_url = watch_url(&id);
        Self {
            id,
            channel_id: channel_id.into(),
            title: title.into(),
            description: String::new(),
            published_at: None,
            thumbnail_url: String::new(),
            video_url,
        }
    }

    /// Set the description, truncated to `max_len` characters.
    pub fn with_description(mut self, description: &str, max_len: usize) -> Self {
        self.description = truncate_chars(description, max_len);
        self
    }

    /// Set the publication time.
    pub fn with_published_at(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = Some(at);
        self
    }

    /// Set the thumbnail URL.
    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = url.into();
        self
    }

    /// Set the canonical URL.
    pub fn with_video_url(mut self, url: impl Into<String>) -> Self {
        self.video_url = url.into();
        self
    }
}

/// A stored video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Video {
    pub id: String,
    pub channel_id: String,
    pub title: String,
    pub description: String,
    pub published_at: Option<DateTime<Utc>>,
    pub thumbnail_url: String,
    pub video_url: String,
    pub fetched_at: DateTime<Utc>,
}

/// A timeline entry: a video plus the title of its channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineVideo {
    #[serde(flatten)]
    pub video: Video,
    pub channel_title: String,
}

/// Canonical watch URL for a video ID.
pub fn watch_url(video_id: &str) -> String {
    format!("{WATCH_URL_BASE}{video_id}")
}

/// Truncate to at most `max_len` characters, respecting char boundaries.
pub fn truncate_chars(s: &str, max_len: usize) -> String {
    s.chars().take(max_len).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_to_channel() {
        let sub = Subscription {
            id: "sub-1".to_string(),
            title: "Rust Talks".to_string(),
            thumbnail: "https://img.example/rust.jpg".to_string(),
            channel_id: "UC123".to_string(),
            description: "talks".to_string(),
        };

        let channel = sub.to_channel();
        assert_eq!(channel.id, "UC123");
        assert_eq!(channel.title, "Rust Talks");
        assert_eq!(channel.handle.as_deref(), Some("UC123"));
        assert_eq!(
            channel.thumbnail_url.as_deref(),
            Some("https://img.example/rust.jpg")
        );
        assert!(channel.last_synced_at.is_none());
    }

    #[test]
    fn test_subscription_to_channel_without_thumbnail() {
        let sub = Subscription {
            id: "sub-1".to_string(),
            title: "t".to_string(),
            thumbnail: String::new(),
            channel_id: "UC1".to_string(),
            description: String::new(),
        };
        assert!(sub.to_channel().thumbnail_url.is_none());
    }

    #[test]
    fn test_new_video_defaults() {
        let video = NewVideo::new("abc", "UC1", "Title");
        assert_eq!(video.video_url, "https://www.youtube.com/watch?v=abc");
        assert_eq!(video.thumbnail_url, "");
        assert_eq!(video.description, "");
        assert!(video.published_at.is_none());
    }

    #[test]
    fn test_with_description_truncates() {
        let long = "a".repeat(6000);
        let video = NewVideo::new("abc", "UC1", "Title").with_description(&long, MAX_DESCRIPTION_LENGTH);
        assert_eq!(video.description.chars().count(), 5000);
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("日本語テキスト", 3), "日本語");
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("", 10), "");
    }
}
