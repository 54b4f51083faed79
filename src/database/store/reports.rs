use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{PaymentReport, ReportStatus, VisitReport};

#[derive(Debug, Clone)]
pub struct NewVisitReport {
    pub asset_id: Uuid,
    pub collector_id: Uuid,
    pub outcome: String,
    pub notes: Option<String>,
    pub gps_lat: Option<f64>,
    pub gps_lng: Option<f64>,
    pub evidence_photo: Option<String>,
    pub commitment_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct NewPaymentReport {
    pub asset_id: Uuid,
    pub collector_id: Uuid,
    pub amount: Decimal,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub evidence_photo: Option<String>,
}

/// Listing scope: admins and managers see everything, collectors only their
/// own submissions.
#[derive(Debug, Clone, Copy)]
pub enum ReportScope {
    All,
    Collector(Uuid),
}

pub async fn insert_visit(
    pool: &PgPool,
    new: &NewVisitReport,
) -> Result<VisitReport, DatabaseError> {
    let report = sqlx::query_as::<_, VisitReport>(
        r#"
        INSERT INTO visit_reports
            (asset_id, collector_id, outcome, notes, gps_lat, gps_lng,
             evidence_photo, commitment_date, status_validation)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'PENDING')
        RETURNING *
        "#,
    )
    .bind(new.asset_id)
    .bind(new.collector_id)
    .bind(&new.outcome)
    .bind(&new.notes)
    .bind(new.gps_lat)
    .bind(new.gps_lng)
    .bind(&new.evidence_photo)
    .bind(new.commitment_date)
    .fetch_one(pool)
    .await?;
    Ok(report)
}

pub async fn insert_payment(
    pool: &PgPool,
    new: &NewPaymentReport,
) -> Result<PaymentReport, DatabaseError> {
    let report = sqlx::query_as::<_, PaymentReport>(
        r#"
        INSERT INTO payment_reports
            (asset_id, collector_id, amount, payment_method, notes,
             evidence_photo, status_validation)
        VALUES ($1, $2, $3, $4, $5, $6, 'PENDING')
        RETURNING *
        "#,
    )
    .bind(new.asset_id)
    .bind(new.collector_id)
    .bind(new.amount)
    .bind(&new.payment_method)
    .bind(&new.notes)
    .bind(&new.evidence_photo)
    .fetch_one(pool)
    .await?;
    Ok(report)
}

pub async fn find_visit(pool: &PgPool, id: Uuid) -> Result<Option<VisitReport>, DatabaseError> {
    let report = sqlx::query_as::<_, VisitReport>("SELECT * FROM visit_reports WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(report)
}

pub async fn find_payment(pool: &PgPool, id: Uuid) -> Result<Option<PaymentReport>, DatabaseError> {
    let report = sqlx::query_as::<_, PaymentReport>("SELECT * FROM payment_reports WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(report)
}

pub async fn list_visits(
    pool: &PgPool,
    scope: ReportScope,
    status: Option<ReportStatus>,
) -> Result<Vec<VisitReport>, DatabaseError> {
    let collector = match scope {
        ReportScope::All => None,
        ReportScope::Collector(id) => Some(id),
    };
    let reports = sqlx::query_as::<_, VisitReport>(
        r#"
        SELECT * FROM visit_reports
        WHERE ($1::uuid IS NULL OR collector_id = $1)
          AND ($2::text IS NULL OR status_validation = $2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(collector)
    .bind(status.map(|s| s.as_str()))
    .fetch_all(pool)
    .await?;
    Ok(reports)
}

pub async fn list_payments(
    pool: &PgPool,
    scope: ReportScope,
    status: Option<ReportStatus>,
) -> Result<Vec<PaymentReport>, DatabaseError> {
    let collector = match scope {
        ReportScope::All => None,
        ReportScope::Collector(id) => Some(id),
    };
    let reports = sqlx::query_as::<_, PaymentReport>(
        r#"
        SELECT * FROM payment_reports
        WHERE ($1::uuid IS NULL OR collector_id = $1)
          AND ($2::text IS NULL OR status_validation = $2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(collector)
    .bind(status.map(|s| s.as_str()))
    .fetch_all(pool)
    .await?;
    Ok(reports)
}

/// Compare-and-swap the validation decision. Only a PENDING report can move;
/// returns None when the row exists but was already decided (or is absent),
/// which callers disambiguate with a follow-up lookup. When `notes` is given
/// it overwrites the report's notes (rejection reason).
pub async fn decide_visit(
    pool: &PgPool,
    id: Uuid,
    decision: ReportStatus,
    notes: Option<&str>,
) -> Result<Option<VisitReport>, DatabaseError> {
    let report = sqlx::query_as::<_, VisitReport>(
        r#"
        UPDATE visit_reports
        SET status_validation = $2,
            notes = COALESCE($3, notes)
        WHERE id = $1 AND status_validation = 'PENDING'
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(decision.as_str())
    .bind(notes)
    .fetch_optional(pool)
    .await?;
    Ok(report)
}

pub async fn decide_payment(
    pool: &PgPool,
    id: Uuid,
    decision: ReportStatus,
    notes: Option<&str>,
) -> Result<Option<PaymentReport>, DatabaseError> {
    let report = sqlx::query_as::<_, PaymentReport>(
        r#"
        UPDATE payment_reports
        SET status_validation = $2,
            notes = COALESCE($3, notes)
        WHERE id = $1 AND status_validation = 'PENDING'
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(decision.as_str())
    .bind(notes)
    .fetch_optional(pool)
    .await?;
    Ok(report)
}

/// Visit count for a collector within a half-open time window.
pub async fn count_visits_between(
    pool: &PgPool,
    collector_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<i64, DatabaseError> {
    let (count,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM visit_reports
        WHERE collector_id = $1 AND created_at >= $2 AND created_at < $3
        "#,
    )
    .bind(collector_id)
    .bind(start)
    .bind(end)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Distinct assets the collector has ever visited.
pub async fn count_distinct_visited_assets(
    pool: &PgPool,
    collector_id: Uuid,
) -> Result<i64, DatabaseError> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(DISTINCT asset_id) FROM visit_reports WHERE collector_id = $1",
    )
    .bind(collector_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Distinct asset ids with a visit report still awaiting validation.
pub async fn pending_visit_asset_ids(
    pool: &PgPool,
    collector_id: Uuid,
) -> Result<Vec<Uuid>, DatabaseError> {
    let rows: Vec<(Uuid,)> = sqlx::query_as(
        r#"
        SELECT DISTINCT asset_id FROM visit_reports
        WHERE collector_id = $1 AND status_validation = 'PENDING'
        "#,
    )
    .bind(collector_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Sum of approved payment amounts for a collector within a half-open time
/// window. Empty result sums to zero.
pub async fn sum_approved_payments_between(
    pool: &PgPool,
    collector_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Decimal, DatabaseError> {
    let (total,): (Decimal,) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(amount), 0) FROM payment_reports
        WHERE collector_id = $1
          AND status_validation = 'APPROVED'
          AND created_at >= $2 AND created_at < $3
        "#,
    )
    .bind(collector_id)
    .bind(start)
    .bind(end)
    .fetch_one(pool)
    .await?;
    Ok(total)
}
