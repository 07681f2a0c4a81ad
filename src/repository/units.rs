use std::collections::HashMap;

use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::map_db_error;
use crate::error::{AppError, AppResult};
use crate::schemas::{CreateUnitInput, UpdateUnitInput};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UnitRow {
    pub id: i64,
    pub unit_number: String,
    pub status: String,
    pub property_id: i64,
}

const COLUMNS: &str = "id, unit_number, status, property_id";

pub async fn list(pool: &PgPool) -> AppResult<Vec<UnitRow>> {
    sqlx::query_as::<_, UnitRow>(&format!("SELECT {COLUMNS} FROM units ORDER BY id"))
        .fetch_all(pool)
        .await
        .map_err(map_db_error)
}

pub async fn get(pool: &PgPool, id: i64) -> AppResult<UnitRow> {
    sqlx::query_as::<_, UnitRow>(&format!("SELECT {COLUMNS} FROM units WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(map_db_error)?
        .ok_or_else(not_found)
}

pub async fn create(pool: &PgPool, input: &CreateUnitInput) -> AppResult<UnitRow> {
    sqlx::query_as::<_, UnitRow>(&format!(
        "INSERT INTO units (unit_number, status, property_id) VALUES ($1, $2, $3) RETURNING {COLUMNS}"
    ))
    .bind(&input.unit_number)
    .bind(&input.status)
    .bind(input.property_id)
    .fetch_one(pool)
    .await
    .map_err(map_db_error)
}

pub async fn update(pool: &PgPool, id: i64, patch: &UpdateUnitInput) -> AppResult<UnitRow> {
    if patch.unit_number.is_none() && patch.status.is_none() && patch.property_id.is_none() {
        return get(pool, id).await;
    }

    let mut query = QueryBuilder::<Postgres>::new("UPDATE units SET ");
    {
        let mut fields = query.separated(", ");
        if let Some(unit_number) = &patch.unit_number {
            fields.push("unit_number = ");
            fields.push_bind_unseparated(unit_number.clone());
        }
        if let Some(status) = &patch.status {
            fields.push("status = ");
            fields.push_bind_unseparated(status.clone());
        }
        if let Some(property_id) = patch.property_id {
            fields.push("property_id = ");
            fields.push_bind_unseparated(property_id);
        }
    }
    query.push(" WHERE id = ").push_bind(id);
    query.push(&format!(" RETURNING {COLUMNS}"));

    query
        .build_query_as::<UnitRow>()
        .fetch_optional(pool)
        .await
        .map_err(map_db_error)?
        .ok_or_else(not_found)
}

pub async fn delete(pool: &PgPool, id: i64) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM units WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(map_db_error)?;
    if result.rows_affected() == 0 {
        return Err(not_found());
    }
    Ok(())
}

/// Occupied and total unit counts, portfolio-wide or for one property.
pub async fn occupancy_counts(pool: &PgPool, property_id: Option<i64>) -> AppResult<(i64, i64)> {
    let row = sqlx::query_as::<_, OccupancyCountsRow>(
        "SELECT COUNT(*) FILTER (WHERE status = 'occupied') AS occupied, COUNT(*) AS total \
         FROM units WHERE ($1::bigint IS NULL OR property_id = $1)",
    )
    .bind(property_id)
    .fetch_one(pool)
    .await
    .map_err(map_db_error)?;
    Ok((row.occupied, row.total))
}

pub async fn numbers_by_ids(pool: &PgPool, ids: &[i64]) -> AppResult<HashMap<i64, String>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = sqlx::query_as::<_, UnitRow>(&format!(
        "SELECT {COLUMNS} FROM units WHERE id = ANY($1)"
    ))
    .bind(ids)
    .fetch_all(pool)
    .await
    .map_err(map_db_error)?;
    Ok(rows
        .into_iter()
        .map(|unit| (unit.id, unit.unit_number))
        .collect())
}

#[derive(sqlx::FromRow)]
struct OccupancyCountsRow {
    occupied: i64,
    total: i64,
}

fn not_found() -> AppError {
    AppError::NotFound("Unit not found.".to_string())
}
