use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use ember_shared::errors::AppResult;
use ember_shared::retry::with_retry;
use ember_shared::types::auth::AuthUser;
use ember_shared::types::ApiResponse;

use crate::models::MatchResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SendLikeRequest {
    pub liked_id: Uuid,
}

/// POST /likes - record a like; reports the match when it turns out mutual
pub async fn send_like(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendLikeRequest>,
) -> AppResult<Json<MatchResult>> {
    // Safe to retry: a repeated insert comes back as alreadyLiked, not a
    // second row
    let result = with_retry(|| state.likes.like_user(user.id, req.liked_id)).await?;
    Ok(Json(result))
}

#[derive(Debug, Serialize)]
pub struct LikeCheckResponse {
    pub already_liked: bool,
}

/// GET /likes/check/:target_id - check if current user already liked target
pub async fn check_like(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(target_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<LikeCheckResponse>>> {
    let already_liked = state.likes.has_liked(user.id, target_id).await?;
    Ok(Json(ApiResponse::ok(LikeCheckResponse { already_liked })))
}
