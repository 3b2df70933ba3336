//! Feat routes.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use grimoire_domain::{EntityKind, Feat, FeatId, NamedRef, Page};
use grimoire_shared::{CreatedResponse, FeatListQuery, FeatRequest, MessageResponse};

use crate::app::App;

use super::error::ApiError;
use super::extractors::{AdminUser, ValidatedJson};

/// GET /api/feats
pub async fn list_feats(
    State(app): State<Arc<App>>,
    Query(query): Query<FeatListQuery>,
) -> Result<Json<Page<Feat>>, ApiError> {
    Ok(Json(app.use_cases.management.feat.list(&query).await?))
}

/// GET /api/feats/all
pub async fn list_all_feats(
    State(app): State<Arc<App>>,
) -> Result<Json<Vec<NamedRef>>, ApiError> {
    Ok(Json(app.use_cases.management.feat.list_all().await?))
}

/// GET /api/feats/{id}
///
/// Includes benefits and prerequisites.
pub async fn get_feat(
    State(app): State<Arc<App>>,
    Path(id): Path<i64>,
) -> Result<Json<Feat>, ApiError> {
    let feat = app
        .use_cases
        .management
        .feat
        .get(FeatId::new(id))
        .await
        .map_err(ApiError::management("Feat"))?;
    Ok(Json(feat))
}

/// POST /api/feats
pub async fn create_feat(
    State(app): State<Arc<App>>,
    _admin: AdminUser,
    ValidatedJson(request): ValidatedJson<FeatRequest>,
) -> Result<(StatusCode, Json<CreatedResponse<i64>>), ApiError> {
    let id = app.use_cases.management.feat.create(&request).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::new(id.get(), "Feat created successfully")),
    ))
}

/// PUT /api/feats/{id}
pub async fn update_feat(
    State(app): State<Arc<App>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    ValidatedJson(request): ValidatedJson<FeatRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    app.use_cases
        .management
        .feat
        .update(FeatId::new(id), &request)
        .await
        .map_err(ApiError::management("Feat"))?;
    app.resolution_cache.forget_kind(EntityKind::Feat).await;
    Ok(Json(MessageResponse::new("Feat updated successfully")))
}

/// DELETE /api/feats/{id}
pub async fn delete_feat(
    State(app): State<Arc<App>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    app.use_cases
        .management
        .feat
        .delete(FeatId::new(id))
        .await
        .map_err(ApiError::management("Feat"))?;
    app.resolution_cache.forget_kind(EntityKind::Feat).await;
    Ok(Json(MessageResponse::new("Feat deleted successfully")))
}
