//! Read-only handlers over the user's stored library.

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::web::dto::{ApiResponse, ChannelResponse, PaginatedResponse, PaginationQuery, VideoResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// GET /api/subscriptions - Channels the user follows.
pub async fn list_subscriptions(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<ChannelResponse>>>, ApiError> {
    let channels = state.store().list_channels_for_user(user.user_id()).await?;

    Ok(Json(ApiResponse::new(
        channels.into_iter().map(ChannelResponse::from).collect(),
    )))
}

/// GET /api/videos - Newest videos across the user's follows.
pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<VideoResponse>>, ApiError> {
    let (offset, limit) = pagination.to_offset_limit();
    let store = state.store();

    let total = store.count_timeline(user.user_id()).await?;
    let videos = store.list_timeline(user.user_id(), limit, offset).await?;

    Ok(Json(PaginatedResponse::new(
        videos.into_iter().map(VideoResponse::from).collect(),
        pagination.page(),
        pagination.per_page(),
        total.max(0) as u64,
    )))
}
