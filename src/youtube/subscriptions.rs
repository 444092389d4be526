//! Data API subscription list client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error};

use super::SubscriptionSource;
use crate::config::{SyncConfig, YoutubeConfig};
use crate::store::Subscription;
use crate::{Result, TubesyncError};

/// One page of the remote subscription list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionPage {
    /// Records on this page.
    pub items: Vec<Subscription>,
    /// Cursor for the next page; `None` on the last page.
    pub next_page_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSubscriptionList {
    #[serde(default)]
    items: Vec<ApiSubscription>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiSubscription {
    #[serde(default)]
    id: String,
    #[serde(default)]
    snippet: ApiSnippet,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSnippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    thumbnails: ApiThumbnails,
    #[serde(default)]
    resource_id: ApiResourceId,
}

#[derive(Debug, Default, Deserialize)]
struct ApiThumbnails {
    #[serde(default)]
    default: Option<ApiThumbnail>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiThumbnail {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResourceId {
    #[serde(default)]
    channel_id: String,
}

impl From<ApiSubscription> for Subscription {
    fn from(item: ApiSubscription) -> Self {
        let snippet = item.snippet;
        Subscription {
            id: item.id,
            title: snippet.title,
            thumbnail: snippet.thumbnails.default.map(|t| t.url).unwrap_or_default(),
            channel_id: snippet.resource_id.channel_id,
            description: snippet.description,
        }
    }
}

impl From<ApiSubscriptionList> for SubscriptionPage {
    fn from(list: ApiSubscriptionList) -> Self {
        SubscriptionPage {
            items: list
                .items
                .into_iter()
                .map(Subscription::from)
                // A record without a channel cannot be followed
                .filter(|s| !s.channel_id.is_empty())
                .collect(),
            next_page_token: list.next_page_token.filter(|t| !t.is_empty()),
        }
    }
}

/// Client for `GET {api_base_url}/subscriptions`.
pub struct YoutubeSubscriptionClient {
    client: Client,
    endpoint: String,
    page_size: u32,
}

impl YoutubeSubscriptionClient {
    /// Create a client over a shared HTTP client.
    pub fn new(client: Client, youtube: &YoutubeConfig, sync: &SyncConfig) -> Self {
        Self {
            client,
            endpoint: format!("{}/subscriptions", youtube.api_base_url.trim_end_matches('/')),
            page_size: sync.page_size,
        }
    }
}

#[async_trait]
impl SubscriptionSource for YoutubeSubscriptionClient {
    async fn fetch_page(
        &self,
        provider_token: &str,
        page_token: Option<&str>,
    ) -> Result<SubscriptionPage> {
        let mut query: Vec<(&str, String)> = vec![
            ("part", "snippet".to_string()),
            ("mine", "true".to_string()),
            ("maxResults", self.page_size.to_string()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }

        let response = self
            .client
            .get(&self.endpoint)
            .bearer_auth(provider_token)
            .query(&query)
            .send()
            .await
            .map_err(|e| TubesyncError::Upstream(format!("failed to fetch subscriptions: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Subscription list request failed with {}: {}", status, body);
            return Err(TubesyncError::Upstream(format!(
                "subscription list returned HTTP {status}"
            )));
        }

        let list: ApiSubscriptionList = response
            .json()
            .await
            .map_err(|e| TubesyncError::Upstream(format!("invalid subscription list: {e}")))?;

        let page = SubscriptionPage::from(list);
        debug!(
            "Fetched subscription page with {} items (more: {})",
            page.items.len(),
            page.next_page_token.is_some()
        );
        Ok(page)
    }
}
