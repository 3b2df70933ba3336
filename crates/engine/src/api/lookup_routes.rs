//! Reference data for clients.

use std::sync::Arc;

use axum::{extract::State, Json};
use grimoire_shared::{LookupsResponse, MessageResponse};

use crate::app::App;

use super::error::ApiError;
use super::extractors::AdminUser;

/// GET /api/lookups
pub async fn get_lookups(State(app): State<Arc<App>>) -> Result<Json<LookupsResponse>, ApiError> {
    Ok(Json(app.use_cases.lookups.all().await?))
}

/// POST /api/lookups/reload
pub async fn reload_lookups(
    State(app): State<Arc<App>>,
    _admin: AdminUser,
) -> Result<Json<MessageResponse>, ApiError> {
    let count = app.use_cases.lookups.reload().await?;
    Ok(Json(MessageResponse::new(format!(
        "Reloaded {} lookup entries",
        count
    ))))
}
