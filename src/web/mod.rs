//! Web API module for tubesync.
//!
//! JSON endpoints to trigger a sync, import channels and browse the stored
//! subscriptions and timeline.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use middleware::JwtState;
pub use router::{create_health_router, create_router};
pub use server::WebServer;
