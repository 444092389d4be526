//! Subscription reconciliation against the directory store.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::staleness::StalenessPolicy;
use crate::store::{Channel, DirectoryStore, Subscription};
use crate::Result;

/// Result of reconciling one user's remote subscription list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// The current subscription view, one entry per channel.
    pub subscriptions: Vec<Subscription>,
    /// Channel IDs whose feed is due for a refresh.
    pub due: Vec<String>,
    /// Number of follows added.
    pub added: usize,
    /// Number of follows removed.
    pub removed: usize,
}

/// Applies the remote subscription list to stored channels and follows.
pub struct Reconciler {
    store: Arc<dyn DirectoryStore>,
    policy: StalenessPolicy,
}

impl Reconciler {
    /// Create a reconciler.
    pub fn new(store: Arc<dyn DirectoryStore>, policy: StalenessPolicy) -> Self {
        Self { store, policy }
    }

    /// Reconcile at the current time.
    pub async fn reconcile(&self, user_id: &str, remote: Vec<Subscription>) -> Result<Reconciliation> {
        self.reconcile_at(user_id, remote, Utc::now()).await
    }

    /// Reconcile as of `now`.
    ///
    /// Store writes are not rolled back if a later step fails.
    pub async fn reconcile_at(
        &self,
        user_id: &str,
        remote: Vec<Subscription>,
        now: DateTime<Utc>,
    ) -> Result<Reconciliation> {
        if remote.is_empty() {
            debug!("No remote subscriptions for user {}", user_id);
            return Ok(Reconciliation::default());
        }

        let candidates = dedupe_by_channel(remote);
        let candidate_ids: Vec<String> = candidates.iter().map(|s| s.channel_id.clone()).collect();

        let existing: HashMap<String, Channel> = self
            .store
            .get_channels(&candidate_ids)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        let mut due = Vec::new();
        let channels: Vec<Channel> = candidates
            .iter()
            .map(|sub| {
                let last_synced_at = existing.get(&sub.channel_id).and_then(|c| c.last_synced_at);
                let stamp = if self.policy.is_due(last_synced_at, now) {
                    due.push(sub.channel_id.clone());
                    now
                } else {
                    // Already synced today; keep the stored stamp
                    last_synced_at.unwrap_or(now)
                };
                sub.to_channel().with_last_synced_at(stamp)
            })
            .collect();

        self.store.upsert_channels(&channels).await?;

        let followed: HashSet<String> = self
            .store
            .list_subscribed_channel_ids(user_id)
            .await?
            .into_iter()
            .collect();
        let wanted: HashSet<&str> = candidate_ids.iter().map(String::as_str).collect();

        let to_add: Vec<String> = candidate_ids
            .iter()
            .filter(|id| !followed.contains(*id))
            .cloned()
            .collect();
        let mut to_remove: Vec<String> = followed
            .iter()
            .filter(|id| !wanted.contains(id.as_str()))
            .cloned()
            .collect();
        to_remove.sort();

        debug!(
            "User {}: {} to add, {} to remove",
            user_id,
            to_add.len(),
            to_remove.len()
        );

        if !to_remove.is_empty() {
            self.store.delete_subscriptions(user_id, &to_remove).await?;
        }
        if !to_add.is_empty() {
            self.store.insert_subscriptions(user_id, &to_add).await?;
        }

        info!(
            "Reconciled {} subscriptions for user {} (+{} -{}, {} due)",
            candidates.len(),
            user_id,
            to_add.len(),
            to_remove.len(),
            due.len()
        );

        Ok(Reconciliation {
            subscriptions: candidates,
            due,
            added: to_add.len(),
            removed: to_remove.len(),
        })
    }
}

/// Keep the first record per channel ID, preserving order.
fn dedupe_by_channel(remote: Vec<Subscription>) -> Vec<Subscription> {
    let mut seen = HashSet::new();
    remote
        .into_iter()
        .filter(|s| seen.insert(s.channel_id.clone()))
        .collect()
}
