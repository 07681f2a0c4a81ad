use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::map_db_error;
use crate::error::{AppError, AppResult};
use crate::schemas::{CreatePaymentInput, UpdatePaymentInput};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PaymentRow {
    pub id: i64,
    pub lease_id: i64,
    pub amount: f64,
    pub date: NaiveDate,
    pub method: String,
}

const COLUMNS: &str = "id, lease_id, amount, date, method";

pub async fn list(pool: &PgPool) -> AppResult<Vec<PaymentRow>> {
    sqlx::query_as::<_, PaymentRow>(&format!(
        "SELECT {COLUMNS} FROM payments ORDER BY date DESC, id DESC"
    ))
    .fetch_all(pool)
    .await
    .map_err(map_db_error)
}

pub async fn get(pool: &PgPool, id: i64) -> AppResult<PaymentRow> {
    sqlx::query_as::<_, PaymentRow>(&format!("SELECT {COLUMNS} FROM payments WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(map_db_error)?
        .ok_or_else(not_found)
}

pub async fn create(pool: &PgPool, input: &CreatePaymentInput) -> AppResult<PaymentRow> {
    sqlx::query_as::<_, PaymentRow>(&format!(
        "INSERT INTO payments (lease_id, amount, date, method) \
         VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
    ))
    .bind(input.lease_id)
    .bind(input.amount)
    .bind(input.date)
    .bind(&input.method)
    .fetch_one(pool)
    .await
    .map_err(map_db_error)
}

pub async fn update(pool: &PgPool, id: i64, patch: &UpdatePaymentInput) -> AppResult<PaymentRow> {
    if patch.lease_id.is_none()
        && patch.amount.is_none()
        && patch.date.is_none()
        && patch.method.is_none()
    {
        return get(pool, id).await;
    }

    let mut query = QueryBuilder::<Postgres>::new("UPDATE payments SET ");
    {
        let mut fields = query.separated(", ");
        if let Some(lease_id) = patch.lease_id {
            fields.push("lease_id = ");
            fields.push_bind_unseparated(lease_id);
        }
        if let Some(amount) = patch.amount {
            fields.push("amount = ");
            fields.push_bind_unseparated(amount);
        }
        if let Some(date) = patch.date {
            fields.push("date = ");
            fields.push_bind_unseparated(date);
        }
        if let Some(method) = &patch.method {
            fields.push("method = ");
            fields.push_bind_unseparated(method.clone());
        }
    }
    query.push(" WHERE id = ").push_bind(id);
    query.push(&format!(" RETURNING {COLUMNS}"));

    query
        .build_query_as::<PaymentRow>()
        .fetch_optional(pool)
        .await
        .map_err(map_db_error)?
        .ok_or_else(not_found)
}

pub async fn delete(pool: &PgPool, id: i64) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM payments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(map_db_error)?;
    if result.rows_affected() == 0 {
        return Err(not_found());
    }
    Ok(())
}

pub async fn list_for_leases(pool: &PgPool, lease_ids: &[i64]) -> AppResult<Vec<PaymentRow>> {
    if lease_ids.is_empty() {
        return Ok(Vec::new());
    }
    sqlx::query_as::<_, PaymentRow>(&format!(
        "SELECT {COLUMNS} FROM payments WHERE lease_id = ANY($1) ORDER BY date, id"
    ))
    .bind(lease_ids)
    .fetch_all(pool)
    .await
    .map_err(map_db_error)
}

/// Payments dated within `[from, to)`, optionally restricted to leases
/// whose unit belongs to one property.
pub async fn in_date_range(
    pool: &PgPool,
    from: NaiveDate,
    to: NaiveDate,
    property_id: Option<i64>,
) -> AppResult<Vec<PaymentRow>> {
    sqlx::query_as::<_, PaymentRow>(
        "SELECT p.id, p.lease_id, p.amount, p.date, p.method \
         FROM payments p \
         JOIN leases l ON l.id = p.lease_id \
         JOIN units u ON u.id = l.unit_id \
         WHERE p.date >= $1 AND p.date < $2 \
           AND ($3::bigint IS NULL OR u.property_id = $3) \
         ORDER BY p.date, p.id",
    )
    .bind(from)
    .bind(to)
    .bind(property_id)
    .fetch_all(pool)
    .await
    .map_err(map_db_error)
}

fn not_found() -> AppError {
    AppError::NotFound("Payment not found.".to_string())
}
