use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Validation lifecycle of a field report. Transitions are monotonic:
/// `Pending -> Approved` or `Pending -> Rejected`, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum ReportStatus {
    #[serde(rename = "PENDING")]
    #[sqlx(rename = "PENDING")]
    Pending,
    #[serde(rename = "APPROVED")]
    #[sqlx(rename = "APPROVED")]
    Approved,
    #[serde(rename = "REJECTED")]
    #[sqlx(rename = "REJECTED")]
    Rejected,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "PENDING",
            ReportStatus::Approved => "APPROVED",
            ReportStatus::Rejected => "REJECTED",
        }
    }
}

impl std::str::FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ReportStatus::Pending),
            "APPROVED" => Ok(ReportStatus::Approved),
            "REJECTED" => Ok(ReportStatus::Rejected),
            other => Err(format!("unknown report status: {}", other)),
        }
    }
}

/// One field visit event submitted by a collector. Immutable after creation
/// except for the validation decision (status + notes on rejection).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VisitReport {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub collector_id: Uuid,
    /// Outcome classification, e.g. "VISITED", "NOT_HOME"
    pub outcome: String,
    pub notes: Option<String>,
    pub gps_lat: Option<f64>,
    pub gps_lng: Option<f64>,
    /// Opaque reference to uploaded evidence; storage is out of scope here
    pub evidence_photo: Option<String>,
    /// Structured promise-to-pay date. Presence of this field is what drives
    /// the JANJI_BAYAR projection on approval.
    pub commitment_date: Option<NaiveDate>,
    pub status_validation: ReportStatus,
    pub created_at: DateTime<Utc>,
}

/// A claimed payment submitted by a collector; same validation lifecycle as
/// a visit report. Approved amounts feed the monthly collected totals.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PaymentReport {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub collector_id: Uuid,
    pub amount: Decimal,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub evidence_photo: Option<String>,
    pub status_validation: ReportStatus,
    pub created_at: DateTime<Utc>,
}
