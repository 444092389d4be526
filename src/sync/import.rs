//! Bulk channel import.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::datetime::never_synced;
use crate::store::{Channel, DirectoryStore};
use crate::{Result, TubesyncError};

/// A channel to import.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ImportChannel {
    /// Platform channel ID.
    pub id: String,
    /// Channel title.
    #[serde(default)]
    pub title: String,
}

impl ImportChannel {
    /// Create an import record.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Store channels as never synced and follow them for `user_id`.
///
/// Records with a blank ID are skipped and repeated IDs keep the first
/// record. Channels that already exist keep their refresh stamp. Returns the
/// number of channels imported.
pub async fn import_channels(
    store: &dyn DirectoryStore,
    user_id: &str,
    channels: &[ImportChannel],
) -> Result<usize> {
    if user_id.is_empty() {
        return Err(TubesyncError::Unauthorized("missing user".to_string()));
    }

    let mut seen = HashSet::new();
    let rows: Vec<Channel> = channels
        .iter()
        .map(|c| (c.id.trim(), c.title.trim()))
        .filter(|(id, _)| !id.is_empty() && seen.insert(id.to_string()))
        .map(|(id, title)| {
            let title = if title.is_empty() { id } else { title };
            Channel::new(id, title).with_last_synced_at(never_synced())
        })
        .collect();

    if rows.is_empty() {
        return Ok(0);
    }

    store.upsert_channels(&rows).await?;

    let ids: Vec<String> = rows.iter().map(|c| c.id.clone()).collect();
    store.insert_subscriptions(user_id, &ids).await?;

    info!("Imported {} channels for user {}", rows.len(), user_id);
    Ok(rows.len())
}
