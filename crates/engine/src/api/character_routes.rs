//! Character routes.
//!
//! Any signed-in user can browse characters; writes are checked against the
//! owner by the use case.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use grimoire_domain::{Character, CharacterId, EntityKind, Page};
use grimoire_shared::{CharacterListQuery, CharacterRequest, CreatedResponse, MessageResponse};

use crate::app::App;

use super::error::ApiError;
use super::extractors::{AuthUser, ValidatedJson};

/// GET /api/characters
pub async fn list_characters(
    State(app): State<Arc<App>>,
    Query(query): Query<CharacterListQuery>,
) -> Result<Json<Page<Character>>, ApiError> {
    Ok(Json(app.use_cases.management.character.list(&query).await?))
}

/// GET /api/characters/{id}
pub async fn get_character(
    State(app): State<Arc<App>>,
    Path(id): Path<i64>,
) -> Result<Json<Character>, ApiError> {
    let character = app
        .use_cases
        .management
        .character
        .get(CharacterId::new(id))
        .await
        .map_err(ApiError::management("Character"))?;
    Ok(Json(character))
}

/// POST /api/characters
pub async fn create_character(
    State(app): State<Arc<App>>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<CharacterRequest>,
) -> Result<(StatusCode, Json<CreatedResponse<i64>>), ApiError> {
    let id = app
        .use_cases
        .management
        .character
        .create(user.actor(), &request)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::new(id.get(), "Character created successfully")),
    ))
}

/// PUT /api/characters/{id}
pub async fn update_character(
    State(app): State<Arc<App>>,
    user: AuthUser,
    Path(id): Path<i64>,
    ValidatedJson(request): ValidatedJson<CharacterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    app.use_cases
        .management
        .character
        .update(user.actor(), CharacterId::new(id), &request)
        .await
        .map_err(ApiError::management("Character"))?;
    app.resolution_cache.forget_kind(EntityKind::Character).await;
    Ok(Json(MessageResponse::new("Character updated successfully")))
}

/// DELETE /api/characters/{id}
pub async fn delete_character(
    State(app): State<Arc<App>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    app.use_cases
        .management
        .character
        .delete(user.actor(), CharacterId::new(id))
        .await
        .map_err(ApiError::management("Character"))?;
    app.resolution_cache.forget_kind(EntityKind::Character).await;
    Ok(Json(MessageResponse::new("Character deleted successfully")))
}
