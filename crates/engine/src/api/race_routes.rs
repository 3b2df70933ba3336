//! Race and race trait routes.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use grimoire_domain::{EntityKind, NamedRef, Page, Race, RaceId, RaceTrait, Slug};
use grimoire_shared::{
    CreatedResponse, MessageResponse, RaceListQuery, RaceRequest, RaceTraitListQuery,
    RaceTraitRequest,
};

use crate::app::App;

use super::error::ApiError;
use super::extractors::{AdminUser, ValidatedJson};

/// GET /api/races
pub async fn list_races(
    State(app): State<Arc<App>>,
    Query(query): Query<RaceListQuery>,
) -> Result<Json<Page<Race>>, ApiError> {
    Ok(Json(app.use_cases.management.race.list(&query).await?))
}

/// GET /api/races/all
pub async fn list_all_races(
    State(app): State<Arc<App>>,
) -> Result<Json<Vec<NamedRef>>, ApiError> {
    Ok(Json(app.use_cases.management.race.list_all().await?))
}

/// GET /api/races/{id}
pub async fn get_race(
    State(app): State<Arc<App>>,
    Path(id): Path<i64>,
) -> Result<Json<Race>, ApiError> {
    let race = app
        .use_cases
        .management
        .race
        .get(RaceId::new(id))
        .await
        .map_err(ApiError::management("Race"))?;
    Ok(Json(race))
}

/// POST /api/races
pub async fn create_race(
    State(app): State<Arc<App>>,
    _admin: AdminUser,
    ValidatedJson(request): ValidatedJson<RaceRequest>,
) -> Result<(StatusCode, Json<CreatedResponse<i64>>), ApiError> {
    let id = app.use_cases.management.race.create(&request).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::new(id.get(), "Race created successfully")),
    ))
}

/// PUT /api/races/{id}
pub async fn update_race(
    State(app): State<Arc<App>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    ValidatedJson(request): ValidatedJson<RaceRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    app.use_cases
        .management
        .race
        .update(RaceId::new(id), &request)
        .await
        .map_err(ApiError::management("Race"))?;
    app.resolution_cache.forget_kind(EntityKind::Race).await;
    Ok(Json(MessageResponse::new("Race updated successfully")))
}

/// DELETE /api/races/{id}
pub async fn delete_race(
    State(app): State<Arc<App>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    app.use_cases
        .management
        .race
        .delete(RaceId::new(id))
        .await
        .map_err(ApiError::management("Race"))?;
    app.resolution_cache.forget_kind(EntityKind::Race).await;
    Ok(Json(MessageResponse::new("Race deleted successfully")))
}

/// GET /api/races/traits
pub async fn list_race_traits(
    State(app): State<Arc<App>>,
    Query(query): Query<RaceTraitListQuery>,
) -> Result<Json<Page<RaceTrait>>, ApiError> {
    Ok(Json(app.use_cases.management.race_trait.list(&query).await?))
}

/// GET /api/races/traits/all
pub async fn list_all_race_traits(
    State(app): State<Arc<App>>,
) -> Result<Json<Vec<RaceTrait>>, ApiError> {
    Ok(Json(app.use_cases.management.race_trait.list_all().await?))
}

/// GET /api/races/traits/{slug}
pub async fn get_race_trait(
    State(app): State<Arc<App>>,
    Path(slug): Path<String>,
) -> Result<Json<RaceTrait>, ApiError> {
    let found = app
        .use_cases
        .management
        .race_trait
        .get(&slug)
        .await
        .map_err(ApiError::management("Race trait"))?;
    Ok(Json(found))
}

/// POST /api/races/traits
pub async fn create_race_trait(
    State(app): State<Arc<App>>,
    _admin: AdminUser,
    ValidatedJson(request): ValidatedJson<RaceTraitRequest>,
) -> Result<(StatusCode, Json<CreatedResponse<Slug>>), ApiError> {
    let slug = app.use_cases.management.race_trait.create(&request).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::new(slug, "Race trait created successfully")),
    ))
}

/// PUT /api/races/traits/{slug}
pub async fn update_race_trait(
    State(app): State<Arc<App>>,
    _admin: AdminUser,
    Path(slug): Path<String>,
    ValidatedJson(request): ValidatedJson<RaceTraitRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    app.use_cases
        .management
        .race_trait
        .update(&slug, &request)
        .await
        .map_err(ApiError::management("Race trait"))?;
    app.resolution_cache.forget_kind(EntityKind::Trait).await;
    Ok(Json(MessageResponse::new("Race trait updated successfully")))
}

/// DELETE /api/races/traits/{slug}
pub async fn delete_race_trait(
    State(app): State<Arc<App>>,
    _admin: AdminUser,
    Path(slug): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    app.use_cases
        .management
        .race_trait
        .delete(&slug)
        .await
        .map_err(ApiError::management("Race trait"))?;
    app.resolution_cache.forget_kind(EntityKind::Trait).await;
    Ok(Json(MessageResponse::new("Race trait deleted successfully")))
}
