use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::map_db_error;
use crate::error::{AppError, AppResult};
use crate::schemas::{CreatePropertyInput, UpdatePropertyInput};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PropertyRow {
    pub id: i64,
    pub name: String,
    pub address: String,
}

const COLUMNS: &str = "id, name, address";

pub async fn list(pool: &PgPool) -> AppResult<Vec<PropertyRow>> {
    sqlx::query_as::<_, PropertyRow>(&format!(
        "SELECT {COLUMNS} FROM properties ORDER BY id"
    ))
    .fetch_all(pool)
    .await
    .map_err(map_db_error)
}

pub async fn get(pool: &PgPool, id: i64) -> AppResult<PropertyRow> {
    sqlx::query_as::<_, PropertyRow>(&format!(
        "SELECT {COLUMNS} FROM properties WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(map_db_error)?
    .ok_or_else(not_found)
}

pub async fn create(pool: &PgPool, input: &CreatePropertyInput) -> AppResult<PropertyRow> {
    sqlx::query_as::<_, PropertyRow>(&format!(
        "INSERT INTO properties (name, address) VALUES ($1, $2) RETURNING {COLUMNS}"
    ))
    .bind(&input.name)
    .bind(&input.address)
    .fetch_one(pool)
    .await
    .map_err(map_db_error)
}

pub async fn update(pool: &PgPool, id: i64, patch: &UpdatePropertyInput) -> AppResult<PropertyRow> {
    if patch.name.is_none() && patch.address.is_none() {
        return get(pool, id).await;
    }

    let mut query = QueryBuilder::<Postgres>::new("UPDATE properties SET ");
    {
        let mut fields = query.separated(", ");
        if let Some(name) = &patch.name {
            fields.push("name = ");
            fields.push_bind_unseparated(name.clone());
        }
        if let Some(address) = &patch.address {
            fields.push("address = ");
            fields.push_bind_unseparated(address.clone());
        }
    }
    query.push(" WHERE id = ").push_bind(id);
    query.push(&format!(" RETURNING {COLUMNS}"));

    query
        .build_query_as::<PropertyRow>()
        .fetch_optional(pool)
        .await
        .map_err(map_db_error)?
        .ok_or_else(not_found)
}

pub async fn delete(pool: &PgPool, id: i64) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM properties WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(map_db_error)?;
    if result.rows_affected() == 0 {
        return Err(not_found());
    }
    Ok(())
}

pub async fn count(pool: &PgPool) -> AppResult<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM properties")
        .fetch_one(pool)
        .await
        .map_err(map_db_error)
}

fn not_found() -> AppError {
    AppError::NotFound("Property not found.".to_string())
}
