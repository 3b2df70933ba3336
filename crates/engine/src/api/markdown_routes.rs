//! Entity resolution and markdown rendering.

use std::sync::Arc;

use axum::{extract::State, Json};
use grimoire_shared::{RenderMarkdownRequest, RenderMarkdownResponse, ResolveRequest, ResolveResponse};

use crate::app::App;

use super::error::ApiError;
use super::extractors::ValidatedJson;

/// POST /api/entities/resolve
pub async fn resolve_entities(
    State(app): State<Arc<App>>,
    ValidatedJson(request): ValidatedJson<ResolveRequest>,
) -> Result<Json<ResolveResponse>, ApiError> {
    Ok(Json(app.use_cases.resolve.execute(&request).await?))
}

/// POST /api/markdown/render
pub async fn render_markdown(
    State(app): State<Arc<App>>,
    ValidatedJson(request): ValidatedJson<RenderMarkdownRequest>,
) -> Result<Json<RenderMarkdownResponse>, ApiError> {
    let html = app.use_cases.markdown.execute(&request).await?;
    Ok(Json(RenderMarkdownResponse { html }))
}
