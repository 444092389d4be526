//! tubesync - YouTube subscription mirror
//!
//! Mirrors a user's YouTube subscriptions into a local store and keeps each
//! followed channel's video feed fresh, so the user can browse one
//! aggregated timeline.

pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod logging;
pub mod store;
pub mod sync;
pub mod web;
pub mod youtube;

pub use config::Config;
pub use db::{Database, DbPool};
pub use error::{Result, TubesyncError};
pub use store::{Channel, DirectoryStore, NewVideo, SqliteStore, Subscription};
pub use sync::{
    BatchReport, BatchScheduler, FeedRefresher, ImportChannel, Reconciler, RefreshQueue,
    RefreshWorker, StalenessPolicy, SyncService,
};
pub use web::WebServer;
pub use youtube::{FeedSource, SubscriptionSource, YoutubeFeedClient, YoutubeSubscriptionClient};
