use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::Assignment;

/// Conditional insert: creates an ACTIVE assignment unless one already exists
/// for the pair. Returns the new row, or None when the pair already had an
/// active assignment. The partial unique index on (asset_id, collector_id)
/// WHERE status = 'ACTIVE' makes this race-free without cross-item locking.
pub async fn ensure_active(
    pool: &PgPool,
    asset_id: Uuid,
    collector_id: Uuid,
) -> Result<Option<Assignment>, DatabaseError> {
    let assignment = sqlx::query_as::<_, Assignment>(
        r#"
        INSERT INTO assignments (asset_id, collector_id, status)
        VALUES ($1, $2, 'ACTIVE')
        ON CONFLICT (asset_id, collector_id) WHERE status = 'ACTIVE' DO NOTHING
        RETURNING *
        "#,
    )
    .bind(asset_id)
    .bind(collector_id)
    .fetch_optional(pool)
    .await?;
    Ok(assignment)
}
