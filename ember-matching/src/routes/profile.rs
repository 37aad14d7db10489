use axum::extract::State;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use ember_shared::errors::{AppError, AppResult, ErrorCode};
use ember_shared::types::auth::AuthUser;
use ember_shared::types::ApiResponse;

use crate::models::{Gender, UpdateUser, UserPreferences, UserProfile};
use crate::AppState;

// --- GET /me ---

pub async fn get_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let profile = state.store.get_profile(user.id)?;
    Ok(Json(ApiResponse::ok(profile)))
}

// --- PATCH /me ---

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 2, max = 100, message = "full name must be 2-100 characters"))]
    pub full_name: Option<String>,
    #[validate(length(min = 3, max = 30, message = "username must be 3-30 characters"))]
    pub username: Option<String>,
    #[validate(length(max = 500, message = "bio must be less than 500 characters"))]
    pub bio: Option<String>,
    pub gender: Option<Gender>,
    pub birthdate: Option<NaiveDate>,
    #[validate(custom = "validate_avatar_url")]
    pub avatar_url: Option<String>,
    pub preferences: Option<UserPreferences>,
}

// Empty string clears the avatar, anything else must be a URL
fn validate_avatar_url(url: &str) -> Result<(), validator::ValidationError> {
    if url.is_empty() || validator::validate_url(url) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid avatar URL"))
    }
}

pub async fn update_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    if let Some(username) = &req.username {
        if !username.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(AppError::new(
                ErrorCode::InvalidUsername,
                "username can only contain letters, numbers, and underscores",
            ));
        }
    }

    if let Some(birthdate) = req.birthdate {
        if age_years(birthdate) < 18 {
            return Err(AppError::new(
                ErrorCode::UnderageBirthdate,
                "you must be at least 18 years old",
            ));
        }
    }

    let preferences = req
        .preferences
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| AppError::internal(e.to_string()))?;

    let changes = UpdateUser {
        full_name: req.full_name,
        username: req.username,
        bio: req.bio,
        gender: req.gender.map(|g| g.to_string()),
        birthdate: req.birthdate,
        avatar_url: req.avatar_url,
        preferences,
    };

    if changes.is_empty() {
        return Err(AppError::bad_request("no fields to update"));
    }

    let profile = state.store.update_profile(user.id, changes)?;
    Ok(Json(ApiResponse::ok(profile)))
}

fn age_years(birthdate: NaiveDate) -> u32 {
    chrono::Utc::now()
        .date_naive()
        .years_since(birthdate)
        .unwrap_or(0)
}
