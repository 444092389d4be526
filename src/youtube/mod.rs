//! YouTube clients for tubesync.
//!
//! Two remote collaborators are reached over HTTP: the Data API subscription
//! list and the per-channel Atom feed. Both sit behind traits so the sync
//! pipeline can be driven by fakes in tests.

mod feed;
mod subscriptions;

pub use feed::{parse_feed, FeedEntries, YoutubeFeedClient, VIDEO_ID_PREFIX};
pub use subscriptions::{SubscriptionPage, YoutubeSubscriptionClient};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::YoutubeConfig;
use crate::store::NewVideo;
use crate::{Result, TubesyncError};

/// User agent string for outgoing requests.
const USER_AGENT: &str = concat!("tubesync/", env!("CARGO_PKG_VERSION"));

/// Paginated list of the channels a user follows.
#[async_trait]
pub trait SubscriptionSource: Send + Sync {
    /// Fetch one page. `page_token` is the cursor from the previous page.
    async fn fetch_page(
        &self,
        provider_token: &str,
        page_token: Option<&str>,
    ) -> Result<SubscriptionPage>;
}

/// Per-channel video feed.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch and normalize the channel's feed.
    async fn fetch(&self, channel_id: &str) -> Result<Vec<NewVideo>>;
}

/// Build the shared HTTP client with the configured limits.
pub fn build_client(config: &YoutubeConfig) -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .read_timeout(Duration::from_secs(config.read_timeout_secs))
        .timeout(Duration::from_secs(config.total_timeout_secs))
        .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| TubesyncError::Config(format!("failed to create HTTP client: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_client_with_defaults() {
        assert!(build_client(&YoutubeConfig::default()).is_ok());
    }

    #[test]
    fn test_user_agent_names_crate() {
        assert!(USER_AGENT.starts_with("tubesync/"));
    }
}
