use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::auth::require_user;
use crate::error::AppResult;
use crate::repository::leases::{self, LeaseRow};
use crate::repository::payments::{self, PaymentRow};
use crate::repository::{tenants, units};
use crate::schemas::{validate_input, CreateLeaseInput, UpdateLeaseInput};
use crate::services::finance::{balance, lease_status, round2, total_paid, LeaseStatus};
use crate::state::AppState;

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/leases", axum::routing::get(list_leases).post(create_lease))
        .route(
            "/leases/{id}",
            axum::routing::get(get_lease)
                .patch(update_lease)
                .delete(delete_lease),
        )
}

/// A lease as the API reports it: stored fields plus derived payment
/// totals, status, and the names a listing page needs.
#[derive(Debug, Serialize)]
struct LeaseView {
    id: i64,
    tenant_id: i64,
    unit_id: i64,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    rent_amount: f64,
    total_paid: f64,
    balance: f64,
    status: LeaseStatus,
    tenant_name: Option<String>,
    unit_number: Option<String>,
}

fn lease_view(
    lease: &LeaseRow,
    payments: &[PaymentRow],
    tenant_names: &HashMap<i64, String>,
    unit_numbers: &HashMap<i64, String>,
    as_of: NaiveDate,
) -> LeaseView {
    let paid = round2(total_paid(payments));
    let owed = balance(lease.rent_amount, paid);
    LeaseView {
        id: lease.id,
        tenant_id: lease.tenant_id,
        unit_id: lease.unit_id,
        start_date: lease.start_date,
        end_date: lease.end_date,
        rent_amount: lease.rent_amount,
        total_paid: paid,
        balance: owed,
        status: lease_status(lease.end_date, owed, as_of),
        tenant_name: tenant_names.get(&lease.tenant_id).cloned(),
        unit_number: unit_numbers.get(&lease.unit_id).cloned(),
    }
}

async fn assemble_views(state: &AppState, rows: Vec<LeaseRow>) -> AppResult<Vec<LeaseView>> {
    let lease_ids: Vec<i64> = rows.iter().map(|lease| lease.id).collect();
    let tenant_ids: Vec<i64> = rows.iter().map(|lease| lease.tenant_id).collect();
    let unit_ids: Vec<i64> = rows.iter().map(|lease| lease.unit_id).collect();

    let all_payments = payments::list_for_leases(&state.db_pool, &lease_ids).await?;
    let tenant_names = tenants::names_by_ids(&state.db_pool, &tenant_ids).await?;
    let unit_numbers = units::numbers_by_ids(&state.db_pool, &unit_ids).await?;

    let mut by_lease: HashMap<i64, Vec<PaymentRow>> = HashMap::new();
    for payment in all_payments {
        by_lease.entry(payment.lease_id).or_default().push(payment);
    }

    let today = Utc::now().date_naive();
    Ok(rows
        .iter()
        .map(|lease| {
            let lease_payments = by_lease.get(&lease.id).map(Vec::as_slice).unwrap_or(&[]);
            lease_view(lease, lease_payments, &tenant_names, &unit_numbers, today)
        })
        .collect())
}

async fn list_leases(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Json<Value>> {
    require_user(&state, &headers).await?;
    let rows = leases::list(&state.db_pool).await?;
    let views = assemble_views(&state, rows).await?;
    Ok(Json(json!(views)))
}

async fn assemble_view(state: &AppState, row: LeaseRow) -> AppResult<LeaseView> {
    let mut views = assemble_views(state, vec![row]).await?;
    Ok(views.remove(0))
}

async fn get_lease(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    require_user(&state, &headers).await?;
    let row = leases::get(&state.db_pool, id).await?;
    let view = assemble_view(&state, row).await?;
    Ok(Json(json!(view)))
}

async fn create_lease(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateLeaseInput>,
) -> AppResult<impl IntoResponse> {
    require_user(&state, &headers).await?;
    validate_input(&payload)?;
    let created = leases::create(&state.db_pool, &payload).await?;
    tracing::info!(lease_id = created.id, unit_id = created.unit_id, "lease created");
    let view = assemble_view(&state, created).await?;
    Ok((StatusCode::CREATED, Json(json!(view))))
}

async fn update_lease(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(payload): Json<UpdateLeaseInput>,
) -> AppResult<Json<Value>> {
    require_user(&state, &headers).await?;
    validate_input(&payload)?;
    let updated = leases::update(&state.db_pool, id, &payload).await?;
    let view = assemble_view(&state, updated).await?;
    Ok(Json(json!(view)))
}

async fn delete_lease(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> AppResult<StatusCode> {
    require_user(&state, &headers).await?;
    leases::delete(&state.db_pool, id).await?;
    tracing::info!(lease_id = id, "lease deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn lease(rent: f64, end: Option<NaiveDate>) -> LeaseRow {
        LeaseRow {
            id: 7,
            tenant_id: 3,
            unit_id: 5,
            start_date: date(2026, 1, 1),
            end_date: end,
            rent_amount: rent,
        }
    }

    fn payment(amount: f64) -> PaymentRow {
        PaymentRow {
            id: 1,
            lease_id: 7,
            amount,
            date: date(2026, 1, 10),
            method: "cash".to_string(),
        }
    }

    #[test]
    fn derives_totals_and_names() {
        let row = lease(12000.0, Some(date(2026, 12, 31)));
        let payments = vec![payment(5000.0), payment(3000.0)];
        let tenant_names = HashMap::from([(3, "Asha Mwangi".to_string())]);
        let unit_numbers = HashMap::from([(5, "B2".to_string())]);

        let view = lease_view(&row, &payments, &tenant_names, &unit_numbers, date(2026, 6, 1));
        assert_eq!(view.total_paid, 8000.0);
        assert_eq!(view.balance, 4000.0);
        assert_eq!(view.status, LeaseStatus::Overdue);
        assert_eq!(view.tenant_name.as_deref(), Some("Asha Mwangi"));
        assert_eq!(view.unit_number.as_deref(), Some("B2"));
    }

    #[test]
    fn missing_lookups_leave_names_unset() {
        let row = lease(1000.0, None);
        let view = lease_view(&row, &[payment(1000.0)], &HashMap::new(), &HashMap::new(), date(2026, 6, 1));
        assert_eq!(view.status, LeaseStatus::Active);
        assert_eq!(view.tenant_name, None);
        assert_eq!(view.unit_number, None);
        assert_eq!(view.balance, 0.0);
    }

    #[test]
    fn status_serializes_with_spaced_label() {
        let row = lease(1000.0, Some(date(2026, 6, 15)));
        let view = lease_view(&row, &[payment(1000.0)], &HashMap::new(), &HashMap::new(), date(2026, 6, 1));
        let value = serde_json::to_value(&view).expect("serialize");
        assert_eq!(value["status"], "Expiring Soon");
    }
}
