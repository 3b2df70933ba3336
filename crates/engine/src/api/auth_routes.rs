//! Account routes: register, login, current user and token refresh.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use grimoire_shared::{
    LoginRequest, LoginResponse, MeResponse, MessageResponse, RegisterRequest, TokenResponse,
};

use crate::app::App;

use super::error::ApiError;
use super::extractors::{AuthUser, ValidatedJson};

/// POST /api/auth/register
pub async fn register(
    State(app): State<Arc<App>>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    app.use_cases.auth.register(&request).await?;
    Ok((StatusCode::CREATED, Json(MessageResponse::new("User created"))))
}

/// POST /api/auth/login
pub async fn login(
    State(app): State<Arc<App>>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    Ok(Json(app.use_cases.auth.login(&request).await?))
}

/// GET /api/auth/me
pub async fn me(
    State(app): State<Arc<App>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<MeResponse>, ApiError> {
    let user = app.use_cases.auth.me(claims.user_id()).await?;
    Ok(Json(MeResponse { user }))
}

/// POST /api/auth/refresh-token
pub async fn refresh_token(
    State(app): State<Arc<App>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = app.use_cases.auth.refresh_token(claims.user_id()).await?;
    Ok(Json(TokenResponse { token }))
}
