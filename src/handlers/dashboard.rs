use axum::{response::Json, Extension};
use serde_json::{json, Value};

use crate::auth::Role;
use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::workflow::dashboard;

/// GET /api/collector/dashboard - Rollups for the authenticated collector
pub async fn collector_dashboard(
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    if user.role != Role::Collector {
        return Err(ApiError::forbidden("dashboard is scoped to collectors"));
    }

    let pool = DatabaseManager::pool().await?;
    let summary = dashboard::summary(pool, user.id).await?;
    Ok(Json(json!({ "success": true, "data": summary })))
}
