//! Reference table routes, keyed by slug.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use grimoire_domain::{Page, ReferenceTableData, ReferenceTableSummary, Slug};
use grimoire_shared::{
    CreatedResponse, MessageResponse, ReferenceTableListQuery, ReferenceTableRequest,
};

use crate::app::App;

use super::error::ApiError;
use super::extractors::{AdminUser, ValidatedJson};

/// GET /api/referencetables
pub async fn list_reference_tables(
    State(app): State<Arc<App>>,
    Query(query): Query<ReferenceTableListQuery>,
) -> Result<Json<Page<ReferenceTableSummary>>, ApiError> {
    Ok(Json(
        app.use_cases.management.reference_table.list(&query).await?,
    ))
}

/// GET /api/referencetables/{slug}
pub async fn get_reference_table(
    State(app): State<Arc<App>>,
    Path(slug): Path<String>,
) -> Result<Json<ReferenceTableData>, ApiError> {
    let table = app
        .use_cases
        .management
        .reference_table
        .get(&slug)
        .await
        .map_err(ApiError::management("Reference table"))?;
    Ok(Json(table))
}

/// POST /api/referencetables
pub async fn create_reference_table(
    State(app): State<Arc<App>>,
    _admin: AdminUser,
    ValidatedJson(request): ValidatedJson<ReferenceTableRequest>,
) -> Result<(StatusCode, Json<CreatedResponse<Slug>>), ApiError> {
    let slug = app
        .use_cases
        .management
        .reference_table
        .create(&request)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::new(
            slug,
            "Reference table created successfully",
        )),
    ))
}

/// PUT /api/referencetables/{slug}
///
/// Columns, rows and cells are replaced wholesale.
pub async fn update_reference_table(
    State(app): State<Arc<App>>,
    _admin: AdminUser,
    Path(slug): Path<String>,
    ValidatedJson(request): ValidatedJson<ReferenceTableRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    app.use_cases
        .management
        .reference_table
        .update(&slug, &request)
        .await
        .map_err(ApiError::management("Reference table"))?;
    // Cached renders may embed the old contents.
    app.resolution_cache.clear().await;
    Ok(Json(MessageResponse::new(
        "Reference table updated successfully",
    )))
}

/// DELETE /api/referencetables/{slug}
pub async fn delete_reference_table(
    State(app): State<Arc<App>>,
    _admin: AdminUser,
    Path(slug): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    app.use_cases
        .management
        .reference_table
        .delete(&slug)
        .await
        .map_err(ApiError::management("Reference table"))?;
    app.resolution_cache.clear().await;
    Ok(Json(MessageResponse::new(
        "Reference table deleted successfully",
    )))
}
