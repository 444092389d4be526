//! Response DTOs for Web API.

use serde::Serialize;

use crate::datetime::to_db;
use crate::store::{Channel, TimelineVideo};

// ============================================================================
// Generic Response Wrappers
// ============================================================================

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Paginated response wrapper.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T: Serialize> {
    /// Response data.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub meta: PaginationMeta,
}

impl<T: Serialize> PaginatedResponse<T> {
    /// Create a new paginated response.
    pub fn new(data: Vec<T>, page: u32, per_page: u32, total: u64) -> Self {
        Self {
            data,
            meta: PaginationMeta {
                page,
                per_page,
                total,
            },
        }
    }
}

/// Pagination metadata.
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u64,
}

// ============================================================================
// Library DTOs
// ============================================================================

/// Import result.
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub message: String,
    pub count: usize,
}

/// A followed channel.
#[derive(Debug, Serialize)]
pub struct ChannelResponse {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub last_synced_at: Option<String>,
}

impl From<Channel> for ChannelResponse {
    fn from(channel: Channel) -> Self {
        Self {
            id: channel.id,
            title: channel.title,
            handle: channel.handle,
            thumbnail_url: channel.thumbnail_url,
            last_synced_at: channel.last_synced_at.as_ref().map(to_db),
        }
    }
}

/// A timeline video.
#[derive(Debug, Serialize)]
pub struct VideoResponse {
    pub id: String,
    pub channel_id: String,
    pub channel_title: String,
    pub title: String,
    pub description: String,
    pub published_at: Option<String>,
    pub thumbnail_url: String,
    pub video_url: String,
}

impl From<TimelineVideo> for VideoResponse {
    fn from(entry: TimelineVideo) -> Self {
        let video = entry.video;
        Self {
            id: video.id,
            channel_id: video.channel_id,
            channel_title: entry.channel_title,
            title: video.title,
            description: video.description,
            published_at: video.published_at.as_ref().map(to_db),
            thumbnail_url: video.thumbnail_url,
            video_url: video.video_url,
        }
    }
}
