//! Sync and import handlers.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::store::Subscription;
use crate::web::dto::{ApiResponse, ImportRequest, ImportResponse, SyncRequest, ValidatedJson};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// POST /api/sync - Mirror the user's YouTube subscriptions.
///
/// Returns the reconciled subscription list; due feeds refresh in the background.
pub async fn sync_subscriptions(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(req): ValidatedJson<SyncRequest>,
) -> Result<Json<ApiResponse<Vec<Subscription>>>, ApiError> {
    let subscriptions = state.sync.sync(user.user_id(), &req.provider_token).await?;
    Ok(Json(ApiResponse::new(subscriptions)))
}

/// POST /api/import - Follow a list of channels.
pub async fn import_channels(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(req): ValidatedJson<ImportRequest>,
) -> Result<Json<ApiResponse<ImportResponse>>, ApiError> {
    let count = state.sync.import(user.user_id(), &req.channels).await?;

    Ok(Json(ApiResponse::new(ImportResponse {
        message: "Import started successfully".to_string(),
        count,
    })))
}
