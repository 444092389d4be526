//! Request DTOs for Web API.

use serde::Deserialize;
use validator::Validate;

use crate::sync::ImportChannel;

/// Default page size for list endpoints.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Largest accepted page size.
pub const MAX_PER_PAGE: u32 = 100;

/// Largest accepted import batch.
pub const MAX_IMPORT_CHANNELS: u64 = 10_000;

/// Sync request.
#[derive(Debug, Deserialize, Validate)]
pub struct SyncRequest {
    /// OAuth access token for the YouTube Data API.
    #[serde(default)]
    pub provider_token: String,
}

/// Import request.
#[derive(Debug, Deserialize, Validate)]
pub struct ImportRequest {
    /// Channels to follow.
    #[validate(length(max = 10000, message = "Too many channels"))]
    pub channels: Vec<ImportChannel>,
}

/// Pagination query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    /// 1-based page number.
    #[serde(default)]
    pub page: Option<u32>,
    /// Items per page.
    #[serde(default)]
    pub per_page: Option<u32>,
}

impl PaginationQuery {
    /// Effective page number (at least 1).
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Effective page size (1..=MAX_PER_PAGE).
    pub fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }

    /// Convert to (offset, limit).
    pub fn to_offset_limit(&self) -> (i64, i64) {
        let per_page = self.per_page() as i64;
        ((self.page() as i64 - 1) * per_page, per_page)
    }
}
