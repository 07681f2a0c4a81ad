use std::collections::HashMap;

use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::map_db_error;
use crate::error::{AppError, AppResult};
use crate::schemas::{CreateTenantInput, UpdateTenantInput};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TenantRow {
    pub id: i64,
    pub name: String,
    pub contact: String,
}

const COLUMNS: &str = "id, name, contact";

pub async fn list(pool: &PgPool) -> AppResult<Vec<TenantRow>> {
    sqlx::query_as::<_, TenantRow>(&format!("SELECT {COLUMNS} FROM tenants ORDER BY id"))
        .fetch_all(pool)
        .await
        .map_err(map_db_error)
}

pub async fn get(pool: &PgPool, id: i64) -> AppResult<TenantRow> {
    sqlx::query_as::<_, TenantRow>(&format!("SELECT {COLUMNS} FROM tenants WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(map_db_error)?
        .ok_or_else(not_found)
}

pub async fn create(pool: &PgPool, input: &CreateTenantInput) -> AppResult<TenantRow> {
    sqlx::query_as::<_, TenantRow>(&format!(
        "INSERT INTO tenants (name, contact) VALUES ($1, $2) RETURNING {COLUMNS}"
    ))
    .bind(&input.name)
    .bind(&input.contact)
    .fetch_one(pool)
    .await
    .map_err(map_db_error)
}

pub async fn update(pool: &PgPool, id: i64, patch: &UpdateTenantInput) -> AppResult<TenantRow> {
    if patch.name.is_none() && patch.contact.is_none() {
        return get(pool, id).await;
    }

    let mut query = QueryBuilder::<Postgres>::new("UPDATE tenants SET ");
    {
        let mut fields = query.separated(", ");
        if let Some(name) = &patch.name {
            fields.push("name = ");
            fields.push_bind_unseparated(name.clone());
        }
        if let Some(contact) = &patch.contact {
            fields.push("contact = ");
            fields.push_bind_unseparated(contact.clone());
        }
    }
    query.push(" WHERE id = ").push_bind(id);
    query.push(&format!(" RETURNING {COLUMNS}"));

    query
        .build_query_as::<TenantRow>()
        .fetch_optional(pool)
        .await
        .map_err(map_db_error)?
        .ok_or_else(not_found)
}

pub async fn delete(pool: &PgPool, id: i64) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM tenants WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(map_db_error)?;
    if result.rows_affected() == 0 {
        return Err(not_found());
    }
    Ok(())
}

pub async fn names_by_ids(pool: &PgPool, ids: &[i64]) -> AppResult<HashMap<i64, String>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = sqlx::query_as::<_, TenantRow>(&format!(
        "SELECT {COLUMNS} FROM tenants WHERE id = ANY($1)"
    ))
    .bind(ids)
    .fetch_all(pool)
    .await
    .map_err(map_db_error)?;
    Ok(rows
        .into_iter()
        .map(|tenant| (tenant.id, tenant.name))
        .collect())
}

fn not_found() -> AppError {
    AppError::NotFound("Tenant not found.".to_string())
}
