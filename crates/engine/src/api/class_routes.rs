//! Class and class feature routes.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use grimoire_domain::{Class, ClassFeature, ClassId, EntityKind, NamedRef, Page, Slug};
use grimoire_shared::{
    ClassFeatureListQuery, ClassFeatureRequest, ClassListQuery, ClassRequest, CreatedResponse,
    MessageResponse,
};

use crate::app::App;

use super::error::ApiError;
use super::extractors::{AdminUser, ValidatedJson};

/// GET /api/classes
pub async fn list_classes(
    State(app): State<Arc<App>>,
    Query(query): Query<ClassListQuery>,
) -> Result<Json<Page<Class>>, ApiError> {
    Ok(Json(app.use_cases.management.class.list(&query).await?))
}

/// GET /api/classes/all
pub async fn list_all_classes(
    State(app): State<Arc<App>>,
) -> Result<Json<Vec<NamedRef>>, ApiError> {
    Ok(Json(app.use_cases.management.class.list_all().await?))
}

/// GET /api/classes/{id}
///
/// Includes the class features granted per level.
pub async fn get_class(
    State(app): State<Arc<App>>,
    Path(id): Path<i64>,
) -> Result<Json<Class>, ApiError> {
    let class = app
        .use_cases
        .management
        .class
        .get(ClassId::new(id))
        .await
        .map_err(ApiError::management("Class"))?;
    Ok(Json(class))
}

/// POST /api/classes
pub async fn create_class(
    State(app): State<Arc<App>>,
    _admin: AdminUser,
    ValidatedJson(request): ValidatedJson<ClassRequest>,
) -> Result<(StatusCode, Json<CreatedResponse<i64>>), ApiError> {
    let id = app.use_cases.management.class.create(&request).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::new(id.get(), "Class created successfully")),
    ))
}

/// PUT /api/classes/{id}
pub async fn update_class(
    State(app): State<Arc<App>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    ValidatedJson(request): ValidatedJson<ClassRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    app.use_cases
        .management
        .class
        .update(ClassId::new(id), &request)
        .await
        .map_err(ApiError::management("Class"))?;
    app.resolution_cache.forget_kind(EntityKind::Class).await;
    Ok(Json(MessageResponse::new("Class updated successfully")))
}

/// DELETE /api/classes/{id}
pub async fn delete_class(
    State(app): State<Arc<App>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    app.use_cases
        .management
        .class
        .delete(ClassId::new(id))
        .await
        .map_err(ApiError::management("Class"))?;
    app.resolution_cache.forget_kind(EntityKind::Class).await;
    Ok(Json(MessageResponse::new("Class deleted successfully")))
}

/// GET /api/classes/features
pub async fn list_class_features(
    State(app): State<Arc<App>>,
    Query(query): Query<ClassFeatureListQuery>,
) -> Result<Json<Page<ClassFeature>>, ApiError> {
    Ok(Json(app.use_cases.management.class_feature.list(&query).await?))
}

/// GET /api/classes/features/all
pub async fn list_all_class_features(
    State(app): State<Arc<App>>,
) -> Result<Json<Vec<ClassFeature>>, ApiError> {
    Ok(Json(app.use_cases.management.class_feature.list_all().await?))
}

/// GET /api/classes/features/{slug}
pub async fn get_class_feature(
    State(app): State<Arc<App>>,
    Path(slug): Path<String>,
) -> Result<Json<ClassFeature>, ApiError> {
    let found = app
        .use_cases
        .management
        .class_feature
        .get(&slug)
        .await
        .map_err(ApiError::management("Class feature"))?;
    Ok(Json(found))
}

/// POST /api/classes/features
pub async fn create_class_feature(
    State(app): State<Arc<App>>,
    _admin: AdminUser,
    ValidatedJson(request): ValidatedJson<ClassFeatureRequest>,
) -> Result<(StatusCode, Json<CreatedResponse<Slug>>), ApiError> {
    let slug = app.use_cases.management.class_feature.create(&request).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::new(slug, "Class feature created successfully")),
    ))
}

/// PUT /api/classes/features/{slug}
pub async fn update_class_feature(
    State(app): State<Arc<App>>,
    _admin: AdminUser,
    Path(slug): Path<String>,
    ValidatedJson(request): ValidatedJson<ClassFeatureRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    app.use_cases
        .management
        .class_feature
        .update(&slug, &request)
        .await
        .map_err(ApiError::management("Class feature"))?;
    Ok(Json(MessageResponse::new("Class feature updated successfully")))
}

/// DELETE /api/classes/features/{slug}
pub async fn delete_class_feature(
    State(app): State<Arc<App>>,
    _admin: AdminUser,
    Path(slug): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    app.use_cases
        .management
        .class_feature
        .delete(&slug)
        .await
        .map_err(ApiError::management("Class feature"))?;
    Ok(Json(MessageResponse::new("Class feature deleted successfully")))
}
