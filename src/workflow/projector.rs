//! Asset state projection: pure derivation of an asset mutation from an
//! approved report. No IO here; persistence of the returned status is the
//! validation handler's job.

use crate::database::models::{Asset, AssetStatus, PaymentReport, ReportStatus, VisitReport};

/// Borrowed view over either report kind.
#[derive(Debug, Clone, Copy)]
pub enum ReportView<'a> {
    Visit(&'a VisitReport),
    Payment(&'a PaymentReport),
}

impl ReportView<'_> {
    fn status(&self) -> ReportStatus {
        match self {
            ReportView::Visit(r) => r.status_validation,
            ReportView::Payment(r) => r.status_validation,
        }
    }
}

/// Decide whether an approved report changes the parent asset's status.
///
/// - A visit report carrying a commitment date marks the asset JANJI_BAYAR.
/// - A payment report never changes asset status; its amount only shows up
///   in monthly collected totals, which are computed on read.
///
/// Reports that are not APPROVED never produce a mutation; the guard makes
/// the function safe to call unconditionally.
pub fn project(report: ReportView<'_>, asset: &Asset) -> Option<AssetStatus> {
    if report.status() != ReportStatus::Approved {
        return None;
    }

    match report {
        ReportView::Visit(visit) => {
            if visit.commitment_date.is_some() && asset.status != AssetStatus::JanjiBayar {
                Some(AssetStatus::JanjiBayar)
            } else {
                None
            }
        }
        ReportView::Payment(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn asset(status: AssetStatus) -> Asset {
        Asset {
            id: Uuid::new_v4(),
            loan_id: "LN-001".into(),
            debtor_name: "Budi".into(),
            debtor_phone: None,
            debtor_address: None,
            branch: None,
            principal: Decimal::new(5_000_000, 0),
            arrears_installment: Decimal::ZERO,
            arrears_penalty: Decimal::ZERO,
            total_arrears: Decimal::ZERO,
            status,
            collector_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn visit(status: ReportStatus, commitment: Option<NaiveDate>) -> VisitReport {
        VisitReport {
            id: Uuid::new_v4(),
            asset_id: Uuid::new_v4(),
            collector_id: Uuid::new_v4(),
            outcome: "VISITED".into(),
            notes: None,
            gps_lat: None,
            gps_lng: None,
            evidence_photo: None,
            commitment_date: commitment,
            status_validation: status,
            created_at: Utc::now(),
        }
    }

    fn payment(status: ReportStatus) -> PaymentReport {
        PaymentReport {
            id: Uuid::new_v4(),
            asset_id: Uuid::new_v4(),
            collector_id: Uuid::new_v4(),
            amount: Decimal::new(250_000, 0),
            payment_method: Some("TRANSFER".into()),
            notes: None,
            evidence_photo: None,
            status_validation: status,
            created_at: Utc::now(),
        }
    }

    fn feb1() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
    }

    #[test]
    fn approved_commitment_visit_flips_to_janji_bayar() {
        let v = visit(ReportStatus::Approved, Some(feb1()));
        let a = asset(AssetStatus::Normal);
        assert_eq!(
            project(ReportView::Visit(&v), &a),
            Some(AssetStatus::JanjiBayar)
        );
    }

    #[test]
    fn approved_visit_without_commitment_leaves_asset_alone() {
        let v = visit(ReportStatus::Approved, None);
        let a = asset(AssetStatus::Normal);
        assert_eq!(project(ReportView::Visit(&v), &a), None);
    }

    #[test]
    fn pending_and_rejected_reports_never_mutate() {
        let a = asset(AssetStatus::Normal);
        let pending = visit(ReportStatus::Pending, Some(feb1()));
        let rejected = visit(ReportStatus::Rejected, Some(feb1()));
        assert_eq!(project(ReportView::Visit(&pending), &a), None);
        assert_eq!(project(ReportView::Visit(&rejected), &a), None);
    }

    #[test]
    fn payment_approval_never_changes_asset_status() {
        let p = payment(ReportStatus::Approved);
        let a = asset(AssetStatus::Normal);
        assert_eq!(project(ReportView::Payment(&p), &a), None);
    }

    #[test]
    fn already_janji_bayar_is_not_rewritten() {
        let v = visit(ReportStatus::Approved, Some(feb1()));
        let a = asset(AssetStatus::JanjiBayar);
        assert_eq!(project(ReportView::Visit(&v), &a), None);
    }
}
