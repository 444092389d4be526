//! Sync orchestration for one user request.

use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{debug, error, info};

use super::import::{import_channels, ImportChannel};
use super::reconciler::Reconciler;
use super::refresher::RefreshQueue;
use super::scheduler::BatchReport;
use super::staleness::StalenessPolicy;
use crate::config::SyncConfig;
use crate::store::{DirectoryStore, Subscription};
use crate::youtube::SubscriptionSource;
use crate::{Result, TubesyncError};

/// Result of a sync: the reconciled view plus the pending refresh, if any.
#[derive(Debug)]
pub struct SyncOutcome {
    /// Current subscription view.
    pub subscriptions: Vec<Subscription>,
    /// Channels queued for refresh.
    pub due: Vec<String>,
    /// Resolves when the queued refresh finishes. `None` when nothing was queued.
    pub refresh: Option<oneshot::Receiver<BatchReport>>,
}

/// Service tying pagination, reconciliation and background refresh together.
pub struct SyncService {
    store: Arc<dyn DirectoryStore>,
    source: Arc<dyn SubscriptionSource>,
    reconciler: Reconciler,
    queue: RefreshQueue,
    max_pages: usize,
}

impl SyncService {
    /// Create a service.
    pub fn new(
        store: Arc<dyn DirectoryStore>,
        source: Arc<dyn SubscriptionSource>,
        queue: RefreshQueue,
        policy: StalenessPolicy,
        max_pages: usize,
    ) -> Self {
        Self {
            reconciler: Reconciler::new(store.clone(), policy),
            store,
            source,
            queue,
            max_pages: max_pages.max(1),
        }
    }

    /// Create a service from the `[sync]` configuration.
    pub fn from_config(
        store: Arc<dyn DirectoryStore>,
        source: Arc<dyn SubscriptionSource>,
        queue: RefreshQueue,
        config: &SyncConfig,
    ) -> Result<Self> {
        let policy = StalenessPolicy::new(config.tz()?);
        Ok(Self::new(store, source, queue, policy, config.max_pages))
    }

    /// The directory store.
    pub fn store(&self) -> &Arc<dyn DirectoryStore> {
        &self.store
    }

    /// Sync a user's subscriptions and queue due channels for refresh.
    pub async fn sync(&self, user_id: &str, provider_token: &str) -> Result<Vec<Subscription>> {
        Ok(self.sync_with_handle(user_id, provider_token).await?.subscriptions)
    }

    /// Like [`SyncService::sync`], also returning a handle on the refresh.
    ///
    /// Refresh failures are only logged and never undo the reconciliation.
    pub async fn sync_with_handle(&self, user_id: &str, provider_token: &str) -> Result<SyncOutcome> {
        if user_id.is_empty() {
            return Err(TubesyncError::Unauthorized("missing user".to_string()));
        }
        let provider_token = provider_token.trim();
        if provider_token.is_empty() {
            return Err(TubesyncError::BadRequest("missing provider token".to_string()));
        }

        info!("Starting subscription sync for user {}", user_id);

        let remote = self.fetch_all(provider_token).await?;
        info!("Fetched {} remote subscriptions", remote.len());

        let reconciliation = self.reconciler.reconcile(user_id, remote).await?;

        let refresh = if reconciliation.due.is_empty() {
            debug!("No channels need refresh (all synced today)");
            None
        } else {
            info!("Queuing {} channels for refresh", reconciliation.due.len());
            match self.queue.submit_with_report(reconciliation.due.clone()) {
                Ok(rx) => Some(rx),
                Err(e) => {
                    error!("Failed to queue refresh for user {}: {}", user_id, e);
                    None
                }
            }
        };

        Ok(SyncOutcome {
            subscriptions: reconciliation.subscriptions,
            due: reconciliation.due,
            refresh,
        })
    }

    /// Fetch every page of the remote list.
    ///
    /// Any page error aborts the whole fetch. More than `max_pages` pages is
    /// treated as an upstream failure.
    pub async fn fetch_all(&self, provider_token: &str) -> Result<Vec<Subscription>> {
        let mut all = Vec::new();
        let mut page_token: Option<String> = None;

        for page_number in 1..=self.max_pages {
            let page = self
                .source
                .fetch_page(provider_token, page_token.as_deref())
                .await?;
            all.extend(page.items);
            debug!("Fetched page {}. Total so far: {}", page_number, all.len());

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => return Ok(all),
            }
        }

        Err(TubesyncError::Upstream(format!(
            "subscription list exceeded {} pages",
            self.max_pages
        )))
    }

    /// Import channels for a user; they are refreshed on the next sync.
    pub async fn import(&self, user_id: &str, channels: &[ImportChannel]) -> Result<usize> {
        import_channels(self.store.as_ref(), user_id, channels).await
    }
}
