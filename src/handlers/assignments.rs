use axum::{response::Json, Extension};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::Role;
use crate::database::manager::DatabaseManager;
use crate::database::store::{assets, assignments, users};
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAssignBody {
    pub collector_id: Option<Uuid>,
    pub asset_ids: Option<Vec<Uuid>>,
}

/// POST /api/assignments/bulk - Assign many assets to one collector in a
/// single batch. Idempotent per pair: an existing ACTIVE assignment is left
/// untouched and reported as skipped. Fail-soft per item.
pub async fn bulk(
    Extension(user): Extension<AuthUser>,
    Json(body): Json<BulkAssignBody>,
) -> Result<Json<Value>, ApiError> {
    user.require_validator()?;

    let collector_id = body
        .collector_id
        .ok_or_else(|| ApiError::validation("collectorId is required"))?;
    let asset_ids = body
        .asset_ids
        .filter(|ids| !ids.is_empty())
        .ok_or_else(|| ApiError::validation("assetIds must be a non-empty list"))?;

    let pool = DatabaseManager::pool().await?;

    let collector = users::find_by_id(pool, collector_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("user {} not found", collector_id)))?;
    if collector.role != Role::Collector {
        return Err(ApiError::validation(format!(
            "user {} is not a collector",
            collector_id
        )));
    }

    let mut created = Vec::new();
    let mut skipped = Vec::new();
    let mut errors: Vec<Value> = Vec::new();

    for asset_id in asset_ids {
        match assets::find(pool, asset_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                errors.push(json!({ "assetId": asset_id, "error": "asset not found" }));
                continue;
            }
            Err(e) => {
                tracing::error!("assignment lookup for {} failed: {}", asset_id, e);
                errors.push(json!({ "assetId": asset_id, "error": "database error" }));
                continue;
            }
        }

        match assignments::ensure_active(pool, asset_id, collector_id).await {
            Ok(Some(assignment)) => {
                // Keep the asset's collector reference in step with the assignment
                if let Err(e) = assets::update(
                    pool,
                    asset_id,
                    &assets::AssetChanges {
                        collector_id: Some(collector_id),
                        ..Default::default()
                    },
                )
                .await
                {
                    tracing::error!("collector backfill for {} failed: {}", asset_id, e);
                }
                created.push(assignment);
            }
            Ok(None) => skipped.push(asset_id),
            Err(e) => {
                tracing::error!("assignment insert for {} failed: {}", asset_id, e);
                errors.push(json!({ "assetId": asset_id, "error": "database error" }));
            }
        }
    }

    tracing::info!(
        collector_id = %collector_id,
        created = created.len(),
        skipped = skipped.len(),
        errors = errors.len(),
        "bulk assignment applied"
    );

    Ok(Json(json!({
        "success": true,
        "data": { "created": created, "skipped": skipped, "errors": errors }
    })))
}
