use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use ember_shared::errors::AppResult;
use ember_shared::retry::with_retry;
use ember_shared::types::auth::AuthUser;
use ember_shared::types::ApiResponse;

use crate::models::UserProfile;
use crate::AppState;

/// GET /matches - the caller's active matches, resolved to counterpart
/// profiles with "matched since" timestamps
pub async fn list_matches(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<UserProfile>>>> {
    let matches = with_retry(|| state.matches.get_user_matches(user.id)).await?;
    Ok(Json(ApiResponse::ok(matches)))
}
