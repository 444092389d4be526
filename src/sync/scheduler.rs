//! Batch scheduler for rate-limited fetches.

use std::future::Future;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, info};

use crate::Result;

/// Outcome of one scheduler run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Size of each batch, in order.
    pub batch_sizes: Vec<usize>,
    /// Number of cooldowns waited between batches.
    pub delays: usize,
    /// Number of sources attempted.
    pub attempted: usize,
    /// Number of sources whose fetch succeeded.
    pub succeeded: usize,
    /// Number of sources whose fetch failed.
    pub failed: usize,
}

impl BatchReport {
    /// Number of batches run.
    pub fn batches(&self) -> usize {
        self.batch_sizes.len()
    }
}

/// Runs fetches in fixed-size concurrent batches separated by a cooldown.
#[derive(Debug, Clone, Copy)]
pub struct BatchScheduler {
    batch_size: usize,
    cooldown: Duration,
}

impl BatchScheduler {
    /// Create a scheduler. A zero batch size is treated as one.
    pub fn new(batch_size: usize, cooldown: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            cooldown,
        }
    }

    /// Batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Cooldown between batches.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Call `fetch` once per source.
    ///
    /// All fetches of a batch run concurrently and settle before the cooldown
    /// starts; no fetch of the next batch starts before it ends. There is no
    /// cooldown after the last batch. A failed fetch only counts as failed.
    pub async fn run<T, F, Fut>(&self, sources: &[T], fetch: F) -> BatchReport
    where
        T: Clone,
        F: Fn(T) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let mut report = BatchReport::default();
        let total_batches = sources.len().div_ceil(self.batch_size);

        for (index, batch) in sources.chunks(self.batch_size).enumerate() {
            if index > 0 {
                debug!("Waiting {}ms before next batch", self.cooldown.as_millis());
                tokio::time::sleep(self.cooldown).await;
                report.delays += 1;
            }

            info!(
                "Processing batch {}/{} ({} sources)",
                index + 1,
                total_batches,
                batch.len()
            );

            let results = join_all(batch.iter().cloned().map(&fetch)).await;

            report.batch_sizes.push(batch.len());
            report.attempted += results.len();
            for result in results {
                match result {
                    Ok(()) => report.succeeded += 1,
                    Err(_) => report.failed += 1,
                }
            }
        }

        report
    }
}

impl Default for BatchScheduler {
    fn default() -> Self {
        Self::new(4, Duration::from_millis(5000))
    }
}
