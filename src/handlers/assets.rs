use axum::{extract::Path, http::StatusCode, response::Json, Extension};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::Role;
use crate::database::manager::DatabaseManager;
use crate::database::models::AssetStatus;
use crate::database::store::assets::{self, AssetChanges, NewAsset};
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetBody {
    pub loan_id: Option<String>,
    pub debtor_name: Option<String>,
    pub debtor_phone: Option<String>,
    pub debtor_address: Option<String>,
    pub branch: Option<String>,
    pub principal: Option<Decimal>,
    pub arrears_installment: Option<Decimal>,
    pub arrears_penalty: Option<Decimal>,
    pub total_arrears: Option<Decimal>,
    pub status: Option<AssetStatus>,
    pub collector_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ImportBody {
    pub assets: Vec<AssetBody>,
}

impl AssetBody {
    fn into_new_asset(self) -> Result<NewAsset, String> {
        let loan_id = self
            .loan_id
            .filter(|s| !s.trim().is_empty())
            .ok_or("loanId is required")?;
        let debtor_name = self
            .debtor_name
            .filter(|s| !s.trim().is_empty())
            .ok_or("debtorName is required")?;
        Ok(NewAsset {
            loan_id,
            debtor_name,
            debtor_phone: self.debtor_phone,
            debtor_address: self.debtor_address,
            branch: self.branch,
            principal: self.principal.unwrap_or(Decimal::ZERO),
            arrears_installment: self.arrears_installment.unwrap_or(Decimal::ZERO),
            arrears_penalty: self.arrears_penalty.unwrap_or(Decimal::ZERO),
            total_arrears: self.total_arrears.unwrap_or(Decimal::ZERO),
            collector_id: self.collector_id,
        })
    }
}

/// GET /api/assets - Collectors see only their own book
pub async fn list(Extension(user): Extension<AuthUser>) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let list = match user.role {
        Role::Collector => assets::list_for_collector(pool, user.id).await?,
        _ => assets::list(pool).await?,
    };
    Ok(Json(json!({ "success": true, "data": list })))
}

/// GET /api/assets/:id
pub async fn get(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let asset = assets::find(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("asset {} not found", id)))?;

    // Collectors may only read assets assigned to them
    if user.role == Role::Collector && asset.collector_id != Some(user.id) {
        return Err(ApiError::forbidden("asset is not assigned to you"));
    }

    Ok(Json(json!({ "success": true, "data": asset })))
}

/// POST /api/assets - Create a single asset (admin/manager)
pub async fn create(
    Extension(user): Extension<AuthUser>,
    Json(body): Json<AssetBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    user.require_validator()?;

    let new = body.into_new_asset().map_err(ApiError::validation)?;
    let pool = DatabaseManager::pool().await?;
    let asset = assets::insert(pool, &new)
        .await?
        .ok_or_else(|| ApiError::conflict(format!("loan {} already exists", new.loan_id)))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": asset })),
    ))
}

/// PUT /api/assets/:id - Direct admin/manager edit, may set any status
pub async fn update(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<AssetBody>,
) -> Result<Json<Value>, ApiError> {
    user.require_validator()?;

    let changes = AssetChanges {
        debtor_name: body.debtor_name,
        debtor_phone: body.debtor_phone,
        debtor_address: body.debtor_address,
        branch: body.branch,
        principal: body.principal,
        arrears_installment: body.arrears_installment,
        arrears_penalty: body.arrears_penalty,
        total_arrears: body.total_arrears,
        status: body.status,
        collector_id: body.collector_id,
    };

    let pool = DatabaseManager::pool().await?;
    let asset = assets::update(pool, id, &changes)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("asset {} not found", id)))?;

    Ok(Json(json!({ "success": true, "data": asset })))
}

/// DELETE /api/assets/:id - Explicit admin delete; assets are never deleted
/// implicitly
pub async fn delete(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    user.require_admin()?;

    let pool = DatabaseManager::pool().await?;
    if !assets::delete(pool, id).await? {
        return Err(ApiError::not_found(format!("asset {} not found", id)));
    }

    Ok(Json(json!({ "success": true, "data": { "deleted": id } })))
}

/// POST /api/assets/import - Bulk import of normalized rows. Fail-soft:
/// per-item errors are collected, the batch never aborts.
pub async fn import(
    Extension(user): Extension<AuthUser>,
    Json(body): Json<ImportBody>,
) -> Result<Json<Value>, ApiError> {
    user.require_validator()?;

    if body.assets.is_empty() {
        return Err(ApiError::validation("assets list is empty"));
    }

    let pool = DatabaseManager::pool().await?;
    let mut created = Vec::new();
    let mut errors: Vec<Value> = Vec::new();

    for (index, row) in body.assets.into_iter().enumerate() {
        let new = match row.into_new_asset() {
            Ok(new) => new,
            Err(msg) => {
                errors.push(json!({ "index": index, "error": msg }));
                continue;
            }
        };
        match assets::insert(pool, &new).await {
            Ok(Some(asset)) => created.push(asset),
            Ok(None) => errors.push(json!({
                "index": index,
                "error": format!("loan {} already exists", new.loan_id)
            })),
            Err(e) => {
                tracing::error!("import row {} failed: {}", index, e);
                errors.push(json!({ "index": index, "error": "database error" }));
            }
        }
    }

    Ok(Json(json!({
        "success": true,
        "data": { "created": created, "errors": errors }
    })))
}
