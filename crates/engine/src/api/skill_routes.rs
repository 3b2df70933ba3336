//! Skill routes.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use grimoire_domain::{EntityKind, NamedRef, Page, Skill, SkillId};
use grimoire_shared::{CreatedResponse, MessageResponse, SkillListQuery, SkillRequest};

use crate::app::App;

use super::error::ApiError;
use super::extractors::{AdminUser, ValidatedJson};

/// GET /api/skills
pub async fn list_skills(
    State(app): State<Arc<App>>,
    Query(query): Query<SkillListQuery>,
) -> Result<Json<Page<Skill>>, ApiError> {
    Ok(Json(app.use_cases.management.skill.list(&query).await?))
}

/// GET /api/skills/all
pub async fn list_all_skills(
    State(app): State<Arc<App>>,
) -> Result<Json<Vec<NamedRef>>, ApiError> {
    Ok(Json(app.use_cases.management.skill.list_all().await?))
}

/// GET /api/skills/{id}
pub async fn get_skill(
    State(app): State<Arc<App>>,
    Path(id): Path<i64>,
) -> Result<Json<Skill>, ApiError> {
    let skill = app
        .use_cases
        .management
        .skill
        .get(SkillId::new(id))
        .await
        .map_err(ApiError::management("Skill"))?;
    Ok(Json(skill))
}

/// POST /api/skills
pub async fn create_skill(
    State(app): State<Arc<App>>,
    _admin: AdminUser,
    ValidatedJson(request): ValidatedJson<SkillRequest>,
) -> Result<(StatusCode, Json<CreatedResponse<i64>>), ApiError> {
    let id = app.use_cases.management.skill.create(&request).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::new(id.get(), "Skill created successfully")),
    ))
}

/// PUT /api/skills/{id}
pub async fn update_skill(
    State(app): State<Arc<App>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    ValidatedJson(request): ValidatedJson<SkillRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    app.use_cases
        .management
        .skill
        .update(SkillId::new(id), &request)
        .await
        .map_err(ApiError::management("Skill"))?;
    app.resolution_cache.forget_kind(EntityKind::Skill).await;
    Ok(Json(MessageResponse::new("Skill updated successfully")))
}

/// DELETE /api/skills/{id}
pub async fn delete_skill(
    State(app): State<Arc<App>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    app.use_cases
        .management
        .skill
        .delete(SkillId::new(id))
        .await
        .map_err(ApiError::management("Skill"))?;
    app.resolution_cache.forget_kind(EntityKind::Skill).await;
    Ok(Json(MessageResponse::new("Skill deleted successfully")))
}
