//! Subscription sync pipeline for tubesync.
//!
//! A sync pages through the remote subscription list, reconciles it with the
//! directory store and queues channels whose feed is due for a background
//! refresh. The refresh runs in fixed-size batches with a cooldown between
//! them, and a failing channel never stops the others.

mod import;
mod reconciler;
mod refresher;
mod scheduler;
mod service;
mod staleness;

pub use import::{import_channels, ImportChannel};
pub use reconciler::{Reconciler, Reconciliation};
pub use refresher::{FeedRefresher, RefreshQueue, RefreshWorker};
pub use scheduler::{BatchReport, BatchScheduler};
pub use service::{SyncOutcome, SyncService};
pub use staleness::StalenessPolicy;
