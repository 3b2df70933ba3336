//! Spell routes.
//!
//! List filters take comma-separated id lists (`classId=1,2&schools=3`).

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use grimoire_domain::{EntityKind, NamedRef, Page, Spell, SpellId};
use grimoire_shared::{CreatedResponse, MessageResponse, SpellListQuery, SpellRequest};

use crate::app::App;

use super::error::ApiError;
use super::extractors::{AdminUser, ValidatedJson};

/// GET /api/spells
pub async fn list_spells(
    State(app): State<Arc<App>>,
    Query(query): Query<SpellListQuery>,
) -> Result<Json<Page<Spell>>, ApiError> {
    Ok(Json(app.use_cases.management.spell.list(&query).await?))
}

/// GET /api/spells/all
pub async fn list_all_spells(
    State(app): State<Arc<App>>,
) -> Result<Json<Vec<NamedRef>>, ApiError> {
    Ok(Json(app.use_cases.management.spell.list_all().await?))
}

/// GET /api/spells/{id}
pub async fn get_spell(
    State(app): State<Arc<App>>,
    Path(id): Path<i64>,
) -> Result<Json<Spell>, ApiError> {
    let spell = app
        .use_cases
        .management
        .spell
        .get(SpellId::new(id))
        .await
        .map_err(ApiError::management("Spell"))?;
    Ok(Json(spell))
}

/// POST /api/spells
pub async fn create_spell(
    State(app): State<Arc<App>>,
    _admin: AdminUser,
    ValidatedJson(request): ValidatedJson<SpellRequest>,
) -> Result<(StatusCode, Json<CreatedResponse<i64>>), ApiError> {
    let id = app.use_cases.management.spell.create(&request).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::new(id.get(), "Spell created successfully")),
    ))
}

/// PUT /api/spells/{id}
pub async fn update_spell(
    State(app): State<Arc<App>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    ValidatedJson(request): ValidatedJson<SpellRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    app.use_cases
        .management
        .spell
        .update(SpellId::new(id), &request)
        .await
        .map_err(ApiError::management("Spell"))?;
    app.resolution_cache.forget_kind(EntityKind::Spell).await;
    Ok(Json(MessageResponse::new("Spell updated successfully")))
}

/// DELETE /api/spells/{id}
pub async fn delete_spell(
    State(app): State<Arc<App>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    app.use_cases
        .management
        .spell
        .delete(SpellId::new(id))
        .await
        .map_err(ApiError::management("Spell"))?;
    app.resolution_cache.forget_kind(EntityKind::Spell).await;
    Ok(Json(MessageResponse::new("Spell deleted successfully")))
}
