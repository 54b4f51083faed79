use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::Json,
    Extension,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use std::str::FromStr;
use uuid::Uuid;

use crate::auth::Role;
use crate::database::manager::DatabaseManager;
use crate::database::models::ReportStatus;
use crate::database::store::reports::{self, ReportScope};
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::workflow::{submission, validation};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitPostBody {
    pub asset_id: Option<Uuid>,
    pub outcome: Option<String>,
    pub notes: Option<String>,
    pub gps_lat: Option<f64>,
    pub gps_lng: Option<f64>,
    pub evidence_photo: Option<String>,
    pub commitment_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPostBody {
    pub asset_id: Option<Uuid>,
    pub amount: Option<Decimal>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub evidence_photo: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionBody {
    pub status: Option<String>,
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

fn parse_status_filter(raw: Option<&str>) -> Result<Option<ReportStatus>, ApiError> {
    raw.map(ReportStatus::from_str)
        .transpose()
        .map_err(ApiError::validation)
}

/// Collectors only see their own submissions; admins and managers see all.
fn scope_for(user: &AuthUser) -> ReportScope {
    match user.role {
        Role::Collector => ReportScope::Collector(user.id),
        _ => ReportScope::All,
    }
}

/// POST /api/reports/visit - Submit a field visit report (collectors only)
pub async fn visit_post(
    Extension(user): Extension<AuthUser>,
    Json(body): Json<VisitPostBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if user.role != Role::Collector {
        return Err(ApiError::forbidden("only collectors submit visit reports"));
    }

    let pool = DatabaseManager::pool().await?;
    let report = submission::submit_visit(
        pool,
        user.id,
        submission::VisitSubmission {
            asset_id: body.asset_id,
            outcome: body.outcome,
            notes: body.notes,
            gps_lat: body.gps_lat,
            gps_lng: body.gps_lng,
            evidence_photo: body.evidence_photo,
            commitment_date: body.commitment_date,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": report })),
    ))
}

/// GET /api/reports/visit?status= - Role-scoped report list
pub async fn visit_get(
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let status = parse_status_filter(query.status.as_deref())?;
    let pool = DatabaseManager::pool().await?;
    let list = reports::list_visits(pool, scope_for(&user), status).await?;
    Ok(Json(json!({ "success": true, "data": list })))
}

/// PATCH /api/reports/visit/:id - Decide a pending visit report
pub async fn visit_patch(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<DecisionBody>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let report = validation::decide_visit(
        pool,
        id,
        validation::Decision {
            status: body.status,
            rejection_reason: body.rejection_reason,
        },
        user.role,
    )
    .await?;

    Ok(Json(json!({ "success": true, "data": report })))
}

/// POST /api/reports/payment - Submit a claimed payment (collectors only)
pub async fn payment_post(
    Extension(user): Extension<AuthUser>,
    Json(body): Json<PaymentPostBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if user.role != Role::Collector {
        return Err(ApiError::forbidden(
            "only collectors submit payment reports",
        ));
    }

    let pool = DatabaseManager::pool().await?;
    let report = submission::submit_payment(
        pool,
        user.id,
        submission::PaymentSubmission {
            asset_id: body.asset_id,
            amount: body.amount,
            payment_method: body.payment_method,
            notes: body.notes,
            evidence_photo: body.evidence_photo,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": report })),
    ))
}

/// GET /api/reports/payment?status=
pub async fn payment_get(
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let status = parse_status_filter(query.status.as_deref())?;
    let pool = DatabaseManager::pool().await?;
    let list = reports::list_payments(pool, scope_for(&user), status).await?;
    Ok(Json(json!({ "success": true, "data": list })))
}

/// PATCH /api/reports/payment/:id - Decide a pending payment report
pub async fn payment_patch(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<DecisionBody>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let report = validation::decide_payment(
        pool,
        id,
        validation::Decision {
            status: body.status,
            rejection_reason: body.rejection_reason,
        },
        user.role,
    )
    .await?;

    Ok(Json(json!({ "success": true, "data": report })))
}
