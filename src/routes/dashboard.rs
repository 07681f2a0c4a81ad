use std::collections::HashMap;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::auth::require_user;
use crate::error::AppResult;
use crate::repository::leases::LeaseRow;
use crate::repository::payments::PaymentRow;
use crate::repository::{leases, payments, properties, tenants, units};
use crate::services::finance::{balance, round2, total_paid, EXPIRING_SOON_WINDOW_DAYS};
use crate::state::AppState;

pub fn router() -> axum::Router<AppState> {
    axum::Router::new().route(
        "/dashboard_summary",
        axum::routing::get(dashboard_summary),
    )
}

#[derive(Debug, Serialize)]
struct OverdueLease {
    lease_id: i64,
    tenant_name: Option<String>,
    unit_number: Option<String>,
    balance: f64,
}

#[derive(Debug, Serialize)]
struct DashboardSummary {
    total_properties: i64,
    occupied_units: i64,
    vacant_units: i64,
    total_monthly_rent: f64,
    total_collected: f64,
    total_pending: f64,
    expiring_leases_count: i64,
    overdue_leases: Vec<OverdueLease>,
}

/// Portfolio roll-up over every lease on file. Pending counts only
/// positive balances, so overpaid leases do not offset what others owe;
/// the overdue list carries any lease in debt, expired or not, and the
/// expiring count is purely a date-window check.
fn build_summary(
    total_properties: i64,
    occupied_units: i64,
    vacant_units: i64,
    lease_rows: &[LeaseRow],
    payments_by_lease: &HashMap<i64, Vec<PaymentRow>>,
    tenant_names: &HashMap<i64, String>,
    unit_numbers: &HashMap<i64, String>,
    as_of: NaiveDate,
) -> DashboardSummary {
    let mut total_monthly_rent = 0.0;
    let mut total_collected = 0.0;
    let mut total_pending = 0.0;
    let mut expiring_leases_count = 0;
    let mut overdue_leases = Vec::new();

    for lease in lease_rows {
        let lease_payments = payments_by_lease
            .get(&lease.id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let paid = total_paid(lease_payments);
        let owed = balance(lease.rent_amount, paid);

        if let Some(end) = lease.end_date {
            if end >= as_of && (end - as_of).num_days() <= EXPIRING_SOON_WINDOW_DAYS {
                expiring_leases_count += 1;
            }
        }
        if owed > 0.0 {
            total_pending += owed;
            overdue_leases.push(OverdueLease {
                lease_id: lease.id,
                tenant_name: tenant_names.get(&lease.tenant_id).cloned(),
                unit_number: unit_numbers.get(&lease.unit_id).cloned(),
                balance: owed,
            });
        }

        total_monthly_rent += lease.rent_amount;
        total_collected += paid;
    }

    DashboardSummary {
        total_properties,
        occupied_units,
        vacant_units,
        total_monthly_rent: round2(total_monthly_rent),
        total_collected: round2(total_collected),
        total_pending: round2(total_pending),
        expiring_leases_count,
        overdue_leases,
    }
}

async fn dashboard_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    require_user(&state, &headers).await?;

    let total_properties = properties::count(&state.db_pool).await?;
    let (occupied_units, total_units) = units::occupancy_counts(&state.db_pool, None).await?;
    let lease_rows = leases::list(&state.db_pool).await?;

    let lease_ids: Vec<i64> = lease_rows.iter().map(|lease| lease.id).collect();
    let tenant_ids: Vec<i64> = lease_rows.iter().map(|lease| lease.tenant_id).collect();
    let unit_ids: Vec<i64> = lease_rows.iter().map(|lease| lease.unit_id).collect();

    let all_payments = payments::list_for_leases(&state.db_pool, &lease_ids).await?;
    let tenant_names = tenants::names_by_ids(&state.db_pool, &tenant_ids).await?;
    let unit_numbers = units::numbers_by_ids(&state.db_pool, &unit_ids).await?;

    let mut payments_by_lease: HashMap<i64, Vec<PaymentRow>> = HashMap::new();
    for payment in all_payments {
        payments_by_lease
            .entry(payment.lease_id)
            .or_default()
            .push(payment);
    }

    let summary = build_summary(
        total_properties,
        occupied_units,
        total_units - occupied_units,
        &lease_rows,
        &payments_by_lease,
        &tenant_names,
        &unit_numbers,
        Utc::now().date_naive(),
    );
    Ok(Json(json!(summary)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn lease(id: i64, rent: f64, end: Option<NaiveDate>) -> LeaseRow {
        LeaseRow {
            id,
            tenant_id: id,
            unit_id: id,
            start_date: date(2026, 1, 1),
            end_date: end,
            rent_amount: rent,
        }
    }

    fn payment(lease_id: i64, amount: f64) -> PaymentRow {
        PaymentRow {
            id: 0,
            lease_id,
            amount,
            date: date(2026, 1, 10),
            method: "cash".to_string(),
        }
    }

    #[test]
    fn aggregates_across_all_leases() {
        let as_of = date(2026, 6, 1);
        let lease_rows = vec![
            lease(1, 1000.0, None),                        // paid, active
            lease(2, 2000.0, Some(date(2026, 5, 1))),      // expired, owes
            lease(3, 1500.0, Some(date(2026, 12, 31))),    // owes, far end date
        ];
        let payments_by_lease = HashMap::from([
            (1, vec![payment(1, 1000.0)]),
            (3, vec![payment(3, 500.0)]),
        ]);
        let tenant_names = HashMap::from([(3, "Joy Otieno".to_string())]);
        let unit_numbers = HashMap::from([(3, "C7".to_string())]);

        let summary = build_summary(
            2, 3, 1, &lease_rows, &payments_by_lease, &tenant_names, &unit_numbers, as_of,
        );

        assert_eq!(summary.total_properties, 2);
        assert_eq!(summary.occupied_units, 3);
        assert_eq!(summary.vacant_units, 1);
        // Expired leases still count toward rent, collection, and debt.
        assert_eq!(summary.total_monthly_rent, 4500.0);
        assert_eq!(summary.total_collected, 1500.0);
        assert_eq!(summary.total_pending, 3000.0);
        assert_eq!(summary.expiring_leases_count, 0);
        assert_eq!(summary.overdue_leases.len(), 2);
        assert_eq!(summary.overdue_leases[0].lease_id, 2);
        assert_eq!(summary.overdue_leases[1].lease_id, 3);
        assert_eq!(summary.overdue_leases[1].balance, 1000.0);
        assert_eq!(summary.overdue_leases[1].tenant_name.as_deref(), Some("Joy Otieno"));
        assert_eq!(summary.overdue_leases[1].unit_number.as_deref(), Some("C7"));
    }

    #[test]
    fn counts_expiring_by_date_window_and_skips_negative_pending() {
        let as_of = date(2026, 6, 1);
        let lease_rows = vec![
            lease(1, 1000.0, Some(date(2026, 7, 1))),  // paid, inside window
            lease(2, 1000.0, None),                    // overpaid
            lease(3, 1000.0, Some(date(2026, 5, 20))), // already ended
            lease(4, 1000.0, Some(date(2026, 9, 1))),  // beyond window
        ];
        let payments_by_lease = HashMap::from([
            (1, vec![payment(1, 1000.0)]),
            (2, vec![payment(2, 1300.0)]),
            (3, vec![payment(3, 1000.0)]),
            (4, vec![payment(4, 1000.0)]),
        ]);

        let summary = build_summary(
            1, 2, 0, &lease_rows, &payments_by_lease, &HashMap::new(), &HashMap::new(), as_of,
        );

        assert_eq!(summary.expiring_leases_count, 1);
        assert_eq!(summary.total_pending, 0.0);
        assert_eq!(summary.total_collected, 4300.0);
        assert!(summary.overdue_leases.is_empty());
    }

    #[test]
    fn empty_portfolio_is_all_zeroes() {
        let summary = build_summary(
            0, 0, 0, &[], &HashMap::new(), &HashMap::new(), &HashMap::new(), date(2026, 6, 1),
        );
        assert_eq!(summary.total_monthly_rent, 0.0);
        assert_eq!(summary.total_collected, 0.0);
        assert_eq!(summary.total_pending, 0.0);
        assert_eq!(summary.expiring_leases_count, 0);
        assert!(summary.overdue_leases.is_empty());
    }
}
