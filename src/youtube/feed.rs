//! Channel Atom feed client.

use async_trait::async_trait;
use feed_rs::model::Entry;
use feed_rs::parser;
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::FeedSource;
use crate::config::{SyncConfig, YoutubeConfig};
use crate::store::{watch_url, NewVideo};
use crate::{Result, TubesyncError};

/// Prefix of video entry IDs in channel feeds.
pub const VIDEO_ID_PREFIX: &str = "yt:video:";

/// Entries of one feed document.
///
/// A feed may carry no entry, exactly one, or a list; all three fold into a
/// single list before normalization.
#[derive(Debug, Clone)]
pub enum FeedEntries {
    Empty,
    Single(Box<Entry>),
    Many(Vec<Entry>),
}

impl From<Vec<Entry>> for FeedEntries {
    fn from(mut entries: Vec<Entry>) -> Self {
        match entries.len() {
            0 => FeedEntries::Empty,
            1 => match entries.pop() {
                Some(entry) => FeedEntries::Single(Box::new(entry)),
                None => FeedEntries::Empty,
            },
            _ => FeedEntries::Many(entries),
        }
    }
}

impl FeedEntries {
    /// Fold into a list.
    pub fn into_vec(self) -> Vec<Entry> {
        match self {
            FeedEntries::Empty => Vec::new(),
            FeedEntries::Single(entry) => vec![*entry],
            FeedEntries::Many(entries) => entries,
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        match self {
            FeedEntries::Empty => 0,
            FeedEntries::Single(_) => 1,
            FeedEntries::Many(entries) => entries.len(),
        }
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parse a channel feed document into videos owned by `channel_id`.
pub fn parse_feed(bytes: &[u8], channel_id: &str, max_description_length: usize) -> Result<Vec<NewVideo>> {
    let feed = parser::parse(bytes)
        .map_err(|e| TubesyncError::Feed(format!("failed to parse feed for {channel_id}: {e}")))?;

    let entries = FeedEntries::from(feed.entries);
    if entries.is_empty() {
        debug!("No entries found for {}", channel_id);
    }

    Ok(entries
        .into_vec()
        .into_iter()
        .filter_map(|entry| entry_to_video(entry, channel_id, max_description_length))
        .collect())
}

fn entry_to_video(entry: Entry, channel_id: &str, max_description_length: usize) -> Option<NewVideo> {
    let id = entry
        .id
        .strip_prefix(VIDEO_ID_PREFIX)
        .unwrap_or(&entry.id)
        .trim()
        .to_string();
    if id.is_empty() {
        return None;
    }

    let title = entry.title.map(|t| t.content).unwrap_or_default();

    let thumbnail = entry
        .media
        .iter()
        .flat_map(|m| m.thumbnails.iter())
        .map(|t| t.image.uri.clone())
        .next()
        .unwrap_or_default();

    let description = entry
        .media
        .iter()
        .find_map(|m| m.description.as_ref().map(|d| d.content.clone()))
        .or_else(|| entry.summary.map(|s| s.content))
        .unwrap_or_default();

    let video_url = entry
        .links
        .first()
        .map(|l| l.href.clone())
        .filter(|href| !href.is_empty())
        .unwrap_or_else(|| watch_url(&id));

    let mut video = NewVideo::new(id, channel_id, title)
        .with_description(&description, max_description_length)
        .with_thumbnail(thumbnail)
        .with_video_url(video_url);
    if let Some(published) = entry.published.or(entry.updated) {
        video = video.with_published_at(published);
    }
    Some(video)
}

/// Client for `GET {feed_base_url}?channel_id={id}`.
pub struct YoutubeFeedClient {
    client: Client,
    feed_base_url: Url,
    max_feed_size: u64,
    max_description_length: usize,
}

impl YoutubeFeedClient {
    /// Create a client over a shared HTTP client.
    pub fn new(client: Client, youtube: &YoutubeConfig, sync: &SyncConfig) -> Result<Self> {
        let feed_base_url = Url::parse(&youtube.feed_base_url)
            .map_err(|e| TubesyncError::Config(format!("invalid feed_base_url: {e}")))?;

        Ok(Self {
            client,
            feed_base_url,
            max_feed_size: youtube.max_feed_size_bytes,
            max_description_length: sync.max_description_length,
        })
    }

    /// The feed URL for a channel.
    pub fn feed_url(&self, channel_id: &str) -> Url {
        let mut url = self.feed_base_url.clone();
        url.query_pairs_mut().append_pair("channel_id", channel_id);
        url
    }

    fn too_large(&self, channel_id: &str, size: u64) -> TubesyncError {
        TubesyncError::Feed(format!(
            "feed for {channel_id} too large: {size} bytes (max {} bytes)",
            self.max_feed_size
        ))
    }
}

#[async_trait]
impl FeedSource for YoutubeFeedClient {
    async fn fetch(&self, channel_id: &str) -> Result<Vec<NewVideo>> {
        let response = self
            .client
            .get(self.feed_url(channel_id))
            .send()
            .await
            .map_err(|e| TubesyncError::Feed(format!("failed to fetch feed for {channel_id}: {e}")))?;

        if !response.status().is_success() {
            return Err(TubesyncError::Feed(format!(
                "feed for {channel_id} returned HTTP {}",
                response.status()
            )));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_feed_size {
                return Err(self.too_large(channel_id, content_length));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TubesyncError::Feed(format!("failed to read feed for {channel_id}: {e}")))?;

        if bytes.len() as u64 > self.max_feed_size {
            return Err(self.too_large(channel_id, bytes.len() as u64));
        }

        debug!("Fetched feed for {} ({} bytes)", channel_id, bytes.len());
        parse_feed(&bytes, channel_id, self.max_description_length)
    }
}
