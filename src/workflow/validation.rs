//! Validation decisions on pending reports. The status transition is a
//! conditional update (only a PENDING row moves), so two admins deciding the
//! same report concurrently cannot both win, and the projector side effect
//! runs at most once per report.

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::Role;
use crate::database::models::{PaymentReport, ReportStatus, VisitReport};
use crate::database::store::{assets, reports};

use super::projector::{self, ReportView};
use super::WorkflowError;

#[derive(Debug, Clone)]
pub struct Decision {
    pub status: Option<String>,
    pub rejection_reason: Option<String>,
}

impl Decision {
    /// Only the two terminal states are valid decisions.
    fn parse(&self) -> Result<ReportStatus, WorkflowError> {
        match self.status.as_deref() {
            Some("APPROVED") => Ok(ReportStatus::Approved),
            Some("REJECTED") => Ok(ReportStatus::Rejected),
            Some(other) => Err(WorkflowError::Validation(format!(
                "status must be APPROVED or REJECTED, got {}",
                other
            ))),
            None => Err(WorkflowError::Validation("status is required".into())),
        }
    }

    fn notes_override(&self, decision: ReportStatus) -> Option<&str> {
        // Rejection reason overwrites notes; approval never rewrites them
        match decision {
            ReportStatus::Rejected => self.rejection_reason.as_deref(),
            _ => None,
        }
    }
}

pub async fn decide_visit(
    pool: &PgPool,
    report_id: Uuid,
    decision: Decision,
    acting_role: Role,
) -> Result<VisitReport, WorkflowError> {
    if !acting_role.can_validate() {
        return Err(WorkflowError::Forbidden(
            "collectors are not allowed to validate reports".into(),
        ));
    }
    let status = decision.parse()?;

    let updated =
        reports::decide_visit(pool, report_id, status, decision.notes_override(status)).await?;

    let report = match updated {
        Some(report) => report,
        None => return Err(visit_decide_failure(pool, report_id).await),
    };

    if status == ReportStatus::Approved {
        apply_visit_projection(pool, &report).await?;
    }

    tracing::info!(
        report_id = %report.id,
        decision = status.as_str(),
        role = %acting_role,
        "visit report decided"
    );
    Ok(report)
}

pub async fn decide_payment(
    pool: &PgPool,
    report_id: Uuid,
    decision: Decision,
    acting_role: Role,
) -> Result<PaymentReport, WorkflowError> {
    if !acting_role.can_validate() {
        return Err(WorkflowError::Forbidden(
            "collectors are not allowed to validate reports".into(),
        ));
    }
    let status = decision.parse()?;

    let updated =
        reports::decide_payment(pool, report_id, status, decision.notes_override(status)).await?;

    let report = match updated {
        Some(report) => report,
        None => return Err(payment_decide_failure(pool, report_id).await),
    };

    // Approved payment amounts are aggregated on read; no asset mutation here.

    tracing::info!(
        report_id = %report.id,
        decision = status.as_str(),
        role = %acting_role,
        "payment report decided"
    );
    Ok(report)
}

/// Persist whatever mutation the projector derives for an approved visit.
async fn apply_visit_projection(pool: &PgPool, report: &VisitReport) -> Result<(), WorkflowError> {
    let asset = assets::find(pool, report.asset_id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound(format!("asset {} not found", report.asset_id)))?;

    if let Some(new_status) = projector::project(ReportView::Visit(report), &asset) {
        assets::set_status(pool, asset.id, new_status).await?;
        tracing::info!(
            asset_id = %asset.id,
            status = new_status.as_str(),
            "asset status advanced by approved visit report"
        );
    }
    Ok(())
}

/// The CAS update matched no row: either the report does not exist, or it was
/// already decided. A follow-up read disambiguates 404 from 409.
async fn visit_decide_failure(pool: &PgPool, report_id: Uuid) -> WorkflowError {
    match reports::find_visit(pool, report_id).await {
        Ok(Some(report)) => WorkflowError::Conflict(format!(
            "report {} already {}",
            report_id,
            report.status_validation.as_str()
        )),
        Ok(None) => WorkflowError::NotFound(format!("report {} not found", report_id)),
        Err(e) => WorkflowError::Database(e),
    }
}

async fn payment_decide_failure(pool: &PgPool, report_id: Uuid) -> WorkflowError {
    match reports::find_payment(pool, report_id).await {
        Ok(Some(report)) => WorkflowError::Conflict(format!(
            "report {} already {}",
            report_id,
            report.status_validation.as_str()
        )),
        Ok(None) => WorkflowError::NotFound(format!("report {} not found", report_id)),
        Err(e) => WorkflowError::Database(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(status: Option<&str>, reason: Option<&str>) -> Decision {
        Decision {
            status: status.map(String::from),
            rejection_reason: reason.map(String::from),
        }
    }

    #[test]
    fn only_terminal_states_are_valid_decisions() {
        assert!(matches!(
            decision(Some("APPROVED"), None).parse(),
            Ok(ReportStatus::Approved)
        ));
        assert!(matches!(
            decision(Some("REJECTED"), None).parse(),
            Ok(ReportStatus::Rejected)
        ));
        assert!(decision(Some("PENDING"), None).parse().is_err());
        assert!(decision(Some("approved"), None).parse().is_err());
        assert!(decision(None, None).parse().is_err());
    }

    #[test]
    fn rejection_reason_only_applies_to_rejections() {
        let d = decision(Some("REJECTED"), Some("foto tidak jelas"));
        assert_eq!(
            d.notes_override(ReportStatus::Rejected),
            Some("foto tidak jelas")
        );

        let d = decision(Some("APPROVED"), Some("should be ignored"));
        assert_eq!(d.notes_override(ReportStatus::Approved), None);

        let d = decision(Some("REJECTED"), None);
        assert_eq!(d.notes_override(ReportStatus::Rejected), None);
    }
}
