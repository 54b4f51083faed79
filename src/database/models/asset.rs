use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Aggregate collection status of a loan record. `JANJI_BAYAR` is only ever
/// set as a consequence of an approved commitment-bearing visit report, or by
/// an explicit admin edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum AssetStatus {
    #[serde(rename = "NORMAL")]
    #[sqlx(rename = "NORMAL")]
    Normal,
    #[serde(rename = "JANJI_BAYAR")]
    #[sqlx(rename = "JANJI_BAYAR")]
    JanjiBayar,
    #[serde(rename = "MACET")]
    #[sqlx(rename = "MACET")]
    Macet,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Normal => "NORMAL",
            AssetStatus::JanjiBayar => "JANJI_BAYAR",
            AssetStatus::Macet => "MACET",
        }
    }
}

/// A tracked loan/debt record subject to collection.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Asset {
    pub id: Uuid,
    /// External loan identifier, unique across the book
    pub loan_id: String,
    pub debtor_name: String,
    pub debtor_phone: Option<String>,
    pub debtor_address: Option<String>,
    pub branch: Option<String>,
    pub principal: Decimal,
    pub arrears_installment: Decimal,
    pub arrears_penalty: Decimal,
    pub total_arrears: Decimal,
    pub status: AssetStatus,
    pub collector_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
