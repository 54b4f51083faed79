//! Read-only dashboard rollups for a collector. Every field is derived
//! fresh per call; an internal staff tool does not need caching here.

use chrono::{DateTime, Datelike, Duration, FixedOffset, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config;
use crate::database::store::{assets, reports};

use super::WorkflowError;

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    /// Visit reports submitted during the current local day
    pub visits_today: i64,
    /// Distinct assets ever visited by this collector
    pub visited_assets: i64,
    /// Collector's assets currently flagged JANJI_BAYAR
    pub janji_bayar_assets: i64,
    /// Sum of APPROVED payment amounts in the current calendar month
    pub monthly_collected: Decimal,
    /// Assets with a visit report still awaiting validation
    pub pending_visit_asset_ids: Vec<Uuid>,
}

pub async fn summary(pool: &PgPool, collector_id: Uuid) -> Result<DashboardSummary, WorkflowError> {
    let offset = local_offset();
    let now = Utc::now();
    let (day_start, day_end) = day_window(now, offset);
    let (month_start, month_end) = month_window(now, offset);

    let visits_today =
        reports::count_visits_between(pool, collector_id, day_start, day_end).await?;
    let visited_assets = reports::count_distinct_visited_assets(pool, collector_id).await?;
    let janji_bayar_assets = assets::count_janji_bayar(pool, collector_id).await?;
    let monthly_collected =
        reports::sum_approved_payments_between(pool, collector_id, month_start, month_end).await?;
    let pending_visit_asset_ids = reports::pending_visit_asset_ids(pool, collector_id).await?;

    Ok(DashboardSummary {
        visits_today,
        visited_assets,
        janji_bayar_assets,
        monthly_collected,
        pending_visit_asset_ids,
    })
}

fn local_offset() -> FixedOffset {
    let hours = config::config().api.dashboard_utc_offset_hours;
    FixedOffset::east_opt(hours * 3600).unwrap_or_else(|| FixedOffset::east_opt(0).unwrap())
}

/// Half-open UTC window covering the current local calendar day.
fn day_window(now: DateTime<Utc>, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
    let local_day = now.with_timezone(&offset).date_naive();
    let start = offset
        .from_local_datetime(&local_day.and_hms_opt(0, 0, 0).unwrap())
        .unwrap()
        .with_timezone(&Utc);
    (start, start + Duration::days(1))
}

/// Half-open UTC window covering the current local calendar month. Equivalent
/// to the inclusive [first day, last day] bound over day-resolution data.
fn month_window(now: DateTime<Utc>, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
    let local = now.with_timezone(&offset).date_naive();
    let first = local.with_day(1).unwrap();
    let next_first = if first.month() == 12 {
        first
            .with_year(first.year() + 1)
            .unwrap()
            .with_month(1)
            .unwrap()
    } else {
        first.with_month(first.month() + 1).unwrap()
    };
    let to_utc = |d: chrono::NaiveDate| {
        offset
            .from_local_datetime(&d.and_hms_opt(0, 0, 0).unwrap())
            .unwrap()
            .with_timezone(&Utc)
    };
    (to_utc(first), to_utc(next_first))
}
