use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use ember_shared::errors::AppResult;
use ember_shared::types::auth::AuthUser;
use ember_shared::types::ApiResponse;

use crate::models::UserProfile;
use crate::services::match_service::DEFAULT_CANDIDATE_LIMIT;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CandidateParams {
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

fn default_limit() -> i64 {
    DEFAULT_CANDIDATE_LIMIT
}

/// GET /candidates?limit=50&offset=0 - preference-filtered discovery page
pub async fn list_candidates(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<CandidateParams>,
) -> AppResult<Json<ApiResponse<Vec<UserProfile>>>> {
    let limit = params.limit.clamp(1, 100);
    let offset = params.offset.max(0);

    let candidates = state
        .matches
        .get_potential_matches(user.id, limit, offset)
        .await?;

    Ok(Json(ApiResponse::ok(candidates)))
}
