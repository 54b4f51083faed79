//! Report submission: persists collector field reports in PENDING state.
//! Submission never touches the parent asset; a claim only affects shared
//! state after it has passed validation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{PaymentReport, VisitReport};
use crate::database::store::{assets, reports};

use super::WorkflowError;

/// Legacy marker older mobile clients embed in free-text notes instead of
/// sending a structured commitment date.
const COMMITMENT_MARKER: &str = "Komitmen:";

#[derive(Debug, Clone)]
pub struct VisitSubmission {
    pub asset_id: Option<Uuid>,
    pub outcome: Option<String>,
    pub notes: Option<String>,
    pub gps_lat: Option<f64>,
    pub gps_lng: Option<f64>,
    pub evidence_photo: Option<String>,
    pub commitment_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct PaymentSubmission {
    pub asset_id: Option<Uuid>,
    pub amount: Option<Decimal>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub evidence_photo: Option<String>,
}

pub async fn submit_visit(
    pool: &PgPool,
    collector_id: Uuid,
    submission: VisitSubmission,
) -> Result<VisitReport, WorkflowError> {
    let asset_id = submission
        .asset_id
        .ok_or_else(|| WorkflowError::Validation("assetId is required".into()))?;
    let outcome = submission
        .outcome
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| WorkflowError::Validation("outcome is required".into()))?;

    if assets::find(pool, asset_id).await?.is_none() {
        return Err(WorkflowError::NotFound(format!(
            "asset {} not found",
            asset_id
        )));
    }

    // Structured field wins; otherwise fall back to the legacy notes marker
    let commitment_date = match submission.commitment_date {
        Some(date) => Some(date),
        None => commitment_from_notes(submission.notes.as_deref())?,
    };

    let report = reports::insert_visit(
        pool,
        &reports::NewVisitReport {
            asset_id,
            collector_id,
            outcome,
            notes: submission.notes,
            gps_lat: submission.gps_lat,
            gps_lng: submission.gps_lng,
            evidence_photo: submission.evidence_photo,
            commitment_date,
        },
    )
    .await?;

    tracing::info!(
        report_id = %report.id,
        asset_id = %asset_id,
        collector_id = %collector_id,
        "visit report submitted"
    );
    Ok(report)
}

pub async fn submit_payment(
    pool: &PgPool,
    collector_id: Uuid,
    submission: PaymentSubmission,
) -> Result<PaymentReport, WorkflowError> {
    let asset_id = submission
        .asset_id
        .ok_or_else(|| WorkflowError::Validation("assetId is required".into()))?;
    let amount = submission
        .amount
        .ok_or_else(|| WorkflowError::Validation("amount is required".into()))?;
    if amount <= Decimal::ZERO {
        return Err(WorkflowError::Validation(
            "amount must be greater than zero".into(),
        ));
    }

    if assets::find(pool, asset_id).await?.is_none() {
        return Err(WorkflowError::NotFound(format!(
            "asset {} not found",
            asset_id
        )));
    }

    let report = reports::insert_payment(
        pool,
        &reports::NewPaymentReport {
            asset_id,
            collector_id,
            amount,
            payment_method: submission.payment_method,
            notes: submission.notes,
            evidence_photo: submission.evidence_photo,
        },
    )
    .await?;

    tracing::info!(
        report_id = %report.id,
        asset_id = %asset_id,
        collector_id = %collector_id,
        %amount,
        "payment report submitted"
    );
    Ok(report)
}

/// Parse a commitment date out of legacy free-text notes, e.g.
/// "Janji ketemu. Komitmen: 2026-02-01". A marker followed by anything that
/// is not a date rejects the submission: a commitment claim has to carry a
/// usable date, since the marker is what advances the asset on approval.
fn commitment_from_notes(notes: Option<&str>) -> Result<Option<NaiveDate>, WorkflowError> {
    let rest = match notes.and_then(|n| n.split(COMMITMENT_MARKER).nth(1)) {
        Some(rest) => rest,
        None => return Ok(None),
    };
    let token = rest.split_whitespace().next().unwrap_or("");
    match NaiveDate::parse_from_str(token, "%Y-%m-%d") {
        Ok(date) => Ok(Some(date)),
        Err(_) => Err(WorkflowError::Validation(format!(
            "commitment marker requires a YYYY-MM-DD date, got {:?}",
            token
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_commitment_date_from_notes() {
        let date = commitment_from_notes(Some("Komitmen: 2026-02-01")).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 2, 1));

        let date =
            commitment_from_notes(Some("Bertemu debitur. Komitmen: 2026-03-15 siang")).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 3, 15));
    }

    #[test]
    fn notes_without_marker_carry_no_commitment() {
        assert_eq!(commitment_from_notes(None).unwrap(), None);
        assert_eq!(
            commitment_from_notes(Some("Tidak ada di rumah")).unwrap(),
            None
        );
    }

    #[test]
    fn marker_without_usable_date_is_rejected() {
        assert!(matches!(
            commitment_from_notes(Some("Komitmen: minggu depan")),
            Err(WorkflowError::Validation(_))
        ));
        assert!(matches!(
            commitment_from_notes(Some("Komitmen:")),
            Err(WorkflowError::Validation(_))
        ));
    }
}
