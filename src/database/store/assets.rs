use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Asset, AssetStatus};

/// Field set for creating an asset, shared by single create and bulk import.
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub loan_id: String,
    pub debtor_name: String,
    pub debtor_phone: Option<String>,
    pub debtor_address: Option<String>,
    pub branch: Option<String>,
    pub principal: Decimal,
    pub arrears_installment: Decimal,
    pub arrears_penalty: Decimal,
    pub total_arrears: Decimal,
    pub collector_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct AssetChanges {
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

pub async fn list(pool: &PgPool) -> Result<Vec<Asset>, DatabaseError> {
    let assets = sqlx::query_as::<_, Asset>("SELECT * FROM assets ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;
    Ok(assets)
}

pub async fn list_for_collector(
    pool: &PgPool,
    collector_id: Uuid,
) -> Result<Vec<Asset>, DatabaseError> {
    let assets = sqlx::query_as::<_, Asset>(
        "SELECT * FROM assets WHERE collector_id = $1 ORDER BY created_at DESC",
    )
    .bind(collector_id)
    .fetch_all(pool)
    .await?;
    Ok(assets)
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Asset>, DatabaseError> {
    let asset = sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(asset)
}

/// Insert a new asset. Returns None when the loan_id already exists, so bulk
/// import can record a per-item duplicate error without aborting the batch.
pub async fn insert(pool: &PgPool, new: &NewAsset) -> Result<Option<Asset>, DatabaseError> {
    let asset = sqlx::query_as::<_, Asset>(
        r#"
        INSERT INTO assets
            (loan_id, debtor_name, debtor_phone, debtor_address, branch,
             principal, arrears_installment, arrears_penalty, total_arrears,
             status, collector_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'NORMAL', $10)
        ON CONFLICT (loan_id) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(&new.loan_id)
    .bind(&new.debtor_name)
    .bind(&new.debtor_phone)
    .bind(&new.debtor_address)
    .bind(&new.branch)
    .bind(new.principal)
    .bind(new.arrears_installment)
    .bind(new.arrears_penalty)
    .bind(new.total_arrears)
    .bind(new.collector_id)
    .fetch_optional(pool)
    .await?;
    Ok(asset)
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    changes: &AssetChanges,
) -> Result<Option<Asset>, DatabaseError> {
    let asset = sqlx::query_as::<_, Asset>(
        r#"
        UPDATE assets SET
            debtor_name         = COALESCE($2, debtor_name),
            debtor_phone        = COALESCE($3, debtor_phone),
            debtor_address      = COALESCE($4, debtor_address),
            branch              = COALESCE($5, branch),
            principal           = COALESCE($6, principal),
            arrears_installment = COALESCE($7, arrears_installment),
            arrears_penalty     = COALESCE($8, arrears_penalty),
            total_arrears       = COALESCE($9, total_arrears),
            status              = COALESCE($10, status),
            collector_id        = COALESCE($11, collector_id),
            updated_at          = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&changes.debtor_name)
    .bind(&changes.debtor_phone)
    .bind(&changes.debtor_address)
    .bind(&changes.branch)
    .bind(changes.principal)
    .bind(changes.arrears_installment)
    .bind(changes.arrears_penalty)
    .bind(changes.total_arrears)
    .bind(changes.status.map(|s| s.as_str()))
    .bind(changes.collector_id)
    .fetch_optional(pool)
    .await?;
    Ok(asset)
}

/// Set only the aggregate status. Used by the projector on report approval.
pub async fn set_status(pool: &PgPool, id: Uuid, status: AssetStatus) -> Result<(), DatabaseError> {
    let result = sqlx::query("UPDATE assets SET status = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(status.as_str())
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("asset {} not found", id)));
    }
    Ok(())
}

/// Explicit admin delete. Assets are never deleted implicitly.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM assets WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Count of a collector's assets currently flagged JANJI_BAYAR.
pub async fn count_janji_bayar(pool: &PgPool, collector_id: Uuid) -> Result<i64, DatabaseError> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM assets WHERE collector_id = $1 AND status = 'JANJI_BAYAR'",
    )
    .bind(collector_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}
