use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::map_db_error;
use crate::error::{AppError, AppResult};
use crate::schemas::{CreateLeaseInput, UpdateLeaseInput};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LeaseRow {
    pub id: i64,
    pub tenant_id: i64,
    pub unit_id: i64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub rent_amount: f64,
}

const COLUMNS: &str = "id, tenant_id, unit_id, start_date, end_date, rent_amount";

pub async fn list(pool: &PgPool) -> AppResult<Vec<LeaseRow>> {
    sqlx::query_as::<_, LeaseRow>(&format!("SELECT {COLUMNS} FROM leases ORDER BY id"))
        .fetch_all(pool)
        .await
        .map_err(map_db_error)
}

pub async fn get(pool: &PgPool, id: i64) -> AppResult<LeaseRow> {
    sqlx::query_as::<_, LeaseRow>(&format!("SELECT {COLUMNS} FROM leases WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(map_db_error)?
        .ok_or_else(not_found)
}

pub async fn create(pool: &PgPool, input: &CreateLeaseInput) -> AppResult<LeaseRow> {
    sqlx::query_as::<_, LeaseRow>(&format!(
        "INSERT INTO leases (tenant_id, unit_id, start_date, end_date, rent_amount) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
    ))
    .bind(input.tenant_id)
    .bind(input.unit_id)
    .bind(input.start_date)
    .bind(input.end_date)
    .bind(input.rent_amount)
    .fetch_one(pool)
    .await
    .map_err(map_db_error)
}

pub async fn update(pool: &PgPool, id: i64, patch: &UpdateLeaseInput) -> AppResult<LeaseRow> {
    if patch.tenant_id.is_none()
        && patch.unit_id.is_none()
        && patch.start_date.is_none()
        && patch.end_date.is_none()
        && patch.rent_amount.is_none()
    {
        return get(pool, id).await;
    }

    let mut query = QueryBuilder::<Postgres>::new("UPDATE leases SET ");
    {
        let mut fields = query.separated(", ");
        if let Some(tenant_id) = patch.tenant_id {
            fields.push("tenant_id = ");
            fields.push_bind_unseparated(tenant_id);
        }
        if let Some(unit_id) = patch.unit_id {
            fields.push("unit_id = ");
            fields.push_bind_unseparated(unit_id);
        }
        if let Some(start_date) = patch.start_date {
            fields.push("start_date = ");
            fields.push_bind_unseparated(start_date);
        }
        // Outer Option distinguishes "field absent" from an explicit null
        // that clears the end date (open-ended lease).
        if let Some(end_date) = patch.end_date {
            fields.push("end_date = ");
            fields.push_bind_unseparated(end_date);
        }
        if let Some(rent_amount) = patch.rent_amount {
            fields.push("rent_amount = ");
            fields.push_bind_unseparated(rent_amount);
        }
    }
    query.push(" WHERE id = ").push_bind(id);
    query.push(&format!(" RETURNING {COLUMNS}"));

    query
        .build_query_as::<LeaseRow>()
        .fetch_optional(pool)
        .await
        .map_err(map_db_error)?
        .ok_or_else(not_found)
}

pub async fn delete(pool: &PgPool, id: i64) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM leases WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(map_db_error)?;
    if result.rows_affected() == 0 {
        return Err(not_found());
    }
    Ok(())
}

fn not_found() -> AppError {
    AppError::NotFound("Lease not found.".to_string())
}
