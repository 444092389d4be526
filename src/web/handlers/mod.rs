//! API handlers for the Web API.

pub mod library;
pub mod sync;

pub use library::*;
pub use sync::*;

use std::sync::Arc;

use crate::store::DirectoryStore;
use crate::sync::SyncService;

/// Application state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Sync pipeline entry point.
    pub sync: Arc<SyncService>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(sync: Arc<SyncService>) -> Self {
        Self { sync }
    }

    /// The directory store behind the sync service.
    pub fn store(&self) -> &Arc<dyn DirectoryStore> {
        self.sync.store()
    }
}
