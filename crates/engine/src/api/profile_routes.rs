//! The signed-in user's profile.

use std::sync::Arc;

use axum::{extract::State, Json};
use grimoire_shared::{ProfileUpdateResponse, ProfileView, UpdateProfileRequest};

use crate::app::App;

use super::error::ApiError;
use super::extractors::{AuthUser, ValidatedJson};

/// GET /api/user/profile
pub async fn get_profile(
    State(app): State<Arc<App>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ProfileView>, ApiError> {
    Ok(Json(app.use_cases.profile.get(claims.user_id()).await?))
}

/// PUT /api/user/profile
pub async fn update_profile(
    State(app): State<Arc<App>>,
    AuthUser(claims): AuthUser,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<ProfileUpdateResponse>, ApiError> {
    let response = app
        .use_cases
        .profile
        .update(claims.user_id(), &request)
        .await?;
    Ok(Json(response))
}
