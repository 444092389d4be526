//! Background feed refresh.
//!
//! Sync requests hand their due channels to a [`RefreshQueue`]; a single
//! [`RefreshWorker`] task drains it, so refreshes from concurrent syncs share
//! one rate limit.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::scheduler::{BatchReport, BatchScheduler};
use crate::store::DirectoryStore;
use crate::youtube::FeedSource;
use crate::{Result, TubesyncError};

/// Fetches channel feeds in batches and stores their videos.
pub struct FeedRefresher {
    store: Arc<dyn DirectoryStore>,
    feeds: Arc<dyn FeedSource>,
    scheduler: BatchScheduler,
}

impl FeedRefresher {
    /// Create a refresher.
    pub fn new(
        store: Arc<dyn DirectoryStore>,
        feeds: Arc<dyn FeedSource>,
        scheduler: BatchScheduler,
    ) -> Self {
        Self {
            store,
            feeds,
            scheduler,
        }
    }

    /// Refresh every channel once. Failures are logged per channel.
    pub async fn refresh(&self, channel_ids: &[String]) -> BatchReport {
        info!("Refreshing feeds for {} channels", channel_ids.len());

        let report = self
            .scheduler
            .run(channel_ids, |channel_id| self.refresh_channel(channel_id))
            .await;

        info!(
            "Feed refresh finished: {} ok, {} failed in {} batches",
            report.succeeded,
            report.failed,
            report.batches()
        );
        report
    }

    async fn refresh_channel(&self, channel_id: String) -> Result<()> {
        let videos = match self.feeds.fetch(&channel_id).await {
            Ok(videos) => videos,
            Err(e) => {
                // The channel was already stamped as synced today
                warn!("Failed to refresh channel {}: {}", channel_id, e);
                return Err(e);
            }
        };

        if videos.is_empty() {
            debug!("No videos in feed for {}", channel_id);
            return Ok(());
        }

        match self.store.upsert_videos(&videos).await {
            Ok(written) => {
                debug!("Stored {} videos for {}", written, channel_id);
                Ok(())
            }
            Err(e) => {
                error!("Failed to store videos for {}: {}", channel_id, e);
                Err(e)
            }
        }
    }
}

/// One queued refresh.
struct RefreshJob {
    channel_ids: Vec<String>,
    done: Option<oneshot::Sender<BatchReport>>,
}

/// Handle for submitting refresh jobs without waiting for them.
#[derive(Clone)]
pub struct RefreshQueue {
    tx: mpsc::UnboundedSender<RefreshJob>,
}

impl RefreshQueue {
    /// Queue channels for refresh.
    pub fn submit(&self, channel_ids: Vec<String>) -> Result<()> {
        self.send(RefreshJob {
            channel_ids,
            done: None,
        })
    }

    /// Queue channels for refresh and get a receiver for the report.
    ///
    /// Dropping the receiver does not cancel the job.
    pub fn submit_with_report(&self, channel_ids: Vec<String>) -> Result<oneshot::Receiver<BatchReport>> {
        let (done, rx) = oneshot::channel();
        self.send(RefreshJob {
            channel_ids,
            done: Some(done),
        })?;
        Ok(rx)
    }

    fn send(&self, job: RefreshJob) -> Result<()> {
        self.tx
            .send(job)
            .map_err(|_| TubesyncError::Internal("refresh worker has stopped".to_string()))
    }
}

/// Task that runs queued refreshes one after another.
pub struct RefreshWorker {
    refresher: FeedRefresher,
    rx: mpsc::UnboundedReceiver<RefreshJob>,
}

impl RefreshWorker {
    /// Create a worker and the queue that feeds it.
    pub fn new(refresher: FeedRefresher) -> (Self, RefreshQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { refresher, rx }, RefreshQueue { tx })
    }

    /// Run until every queue handle is dropped.
    pub async fn run(mut self) {
        info!("Refresh worker started");

        while let Some(job) = self.rx.recv().await {
            if job.channel_ids.is_empty() {
                debug!("Skipping empty refresh job");
                if let Some(done) = job.done {
                    let _ = done.send(BatchReport::default());
                }
                continue;
            }

            let report = self.refresher.refresh(&job.channel_ids).await;
            if let Some(done) = job.done {
                let _ = done.send(report);
            }
        }

        info!("Refresh worker stopped");
    }

    /// Spawn the worker on the tokio runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
