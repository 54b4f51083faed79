use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum AssignmentStatus {
    #[serde(rename = "ACTIVE")]
    #[sqlx(rename = "ACTIVE")]
    Active,
    #[serde(rename = "INACTIVE")]
    #[sqlx(rename = "INACTIVE")]
    Inactive,
}

/// Join entity linking a collector to an asset. A partial unique index in the
/// schema guarantees at most one ACTIVE row per (asset, collector) pair.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Assignment {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub collector_id: Uuid,
    pub status: AssignmentStatus,
    pub created_at: DateTime<Utc>,
}
