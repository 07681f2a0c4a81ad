use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::map_db_error;
use crate::error::{AppError, AppResult};
use crate::schemas::{CreateExpenseInput, UpdateExpenseInput};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ExpenseRow {
    pub id: i64,
    pub property_id: i64,
    pub category: String,
    pub description: Option<String>,
    pub amount: f64,
    pub date: NaiveDate,
}

const COLUMNS: &str = "id, property_id, category, description, amount, date";

pub async fn list(pool: &PgPool) -> AppResult<Vec<ExpenseRow>> {
    sqlx::query_as::<_, ExpenseRow>(&format!(
        "SELECT {COLUMNS} FROM expenses ORDER BY date DESC, id DESC"
    ))
    .fetch_all(pool)
    .await
    .map_err(map_db_error)
}

pub async fn get(pool: &PgPool, id: i64) -> AppResult<ExpenseRow> {
    sqlx::query_as::<_, ExpenseRow>(&format!("SELECT {COLUMNS} FROM expenses WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(map_db_error)?
        .ok_or_else(not_found)
}

pub async fn create(pool: &PgPool, input: &CreateExpenseInput) -> AppResult<ExpenseRow> {
    sqlx::query_as::<_, ExpenseRow>(&format!(
        "INSERT INTO expenses (property_id, category, description, amount, date) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
    ))
    .bind(input.property_id)
    .bind(&input.category)
    .bind(&input.description)
    .bind(input.amount)
    .bind(input.date)
    .fetch_one(pool)
    .await
    .map_err(map_db_error)
}

pub async fn update(pool: &PgPool, id: i64, patch: &UpdateExpenseInput) -> AppResult<ExpenseRow> {
    if patch.property_id.is_none()
        && patch.category.is_none()
        && patch.description.is_none()
        && patch.amount.is_none()
        && patch.date.is_none()
    {
        return get(pool, id).await;
    }

    let mut query = QueryBuilder::<Postgres>::new("UPDATE expenses SET ");
    {
        let mut fields = query.separated(", ");
        if let Some(property_id) = patch.property_id {
            fields.push("property_id = ");
            fields.push_bind_unseparated(property_id);
        }
        if let Some(category) = &patch.category {
            fields.push("category = ");
            fields.push_bind_unseparated(category.clone());
        }
        if let Some(description) = &patch.description {
            fields.push("description = ");
            fields.push_bind_unseparated(description.clone());
        }
        if let Some(amount) = patch.amount {
            fields.push("amount = ");
            fields.push_bind_unseparated(amount);
        }
        if let Some(date) = patch.date {
            fields.push("date = ");
            fields.push_bind_unseparated(date);
        }
    }
    query.push(" WHERE id = ").push_bind(id);
    query.push(&format!(" RETURNING {COLUMNS}"));

    query
        .build_query_as::<ExpenseRow>()
        .fetch_optional(pool)
        .await
        .map_err(map_db_error)?
        .ok_or_else(not_found)
}

pub async fn delete(pool: &PgPool, id: i64) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(map_db_error)?;
    if result.rows_affected() == 0 {
        return Err(not_found());
    }
    Ok(())
}

/// Expenses dated within `[from, to)`, optionally restricted to one
/// property. Ordered by date so the category breakdown is deterministic.
pub async fn in_date_range(
    pool: &PgPool,
    from: NaiveDate,
    to: NaiveDate,
    property_id: Option<i64>,
) -> AppResult<Vec<ExpenseRow>> {
    sqlx::query_as::<_, ExpenseRow>(&format!(
        "SELECT {COLUMNS} FROM expenses \
         WHERE date >= $1 AND date < $2 \
           AND ($3::bigint IS NULL OR property_id = $3) \
         ORDER BY date, id"
    ))
    .bind(from)
    .bind(to)
    .bind(property_id)
    .fetch_all(pool)
    .await
    .map_err(map_db_error)
}

fn not_found() -> AppError {
    AppError::NotFound("Expense not found.".to_string())
}
