use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::map_db_error;
use crate::error::{AppError, AppResult};

/// Full account row. Never serialized; responses go through [`UserProfile`]
/// so the password hash cannot leak into a payload.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub currency: String,
}

impl From<UserRow> for UserProfile {
    fn from(user: UserRow) -> Self {
        Self {
            id: user.id,
            username: user.username,
            currency: user.currency,
        }
    }
}

/// Only supplied fields change; `password_hash` is set by the account
/// routes after the current-password check.
#[derive(Debug, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub currency: Option<String>,
    pub password_hash: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.currency.is_none() && self.password_hash.is_none()
    }
}

const COLUMNS: &str = "id, username, password_hash, currency";

pub async fn get(pool: &PgPool, id: i64) -> AppResult<UserRow> {
    sqlx::query_as::<_, UserRow>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(map_db_error)?
        .ok_or_else(not_found)
}

pub async fn find_by_username(pool: &PgPool, username: &str) -> AppResult<Option<UserRow>> {
    sqlx::query_as::<_, UserRow>(&format!("SELECT {COLUMNS} FROM users WHERE username = $1"))
        .bind(username)
        .fetch_optional(pool)
        .await
        .map_err(map_db_error)
}

pub async fn create(pool: &PgPool, username: &str, password_hash: &str) -> AppResult<UserRow> {
    sqlx::query_as::<_, UserRow>(&format!(
        "INSERT INTO users (username, password_hash) VALUES ($1, $2) RETURNING {COLUMNS}"
    ))
    .bind(username)
    .bind(password_hash)
    .fetch_one(pool)
    .await
    .map_err(|error| match map_db_error(error) {
        AppError::Conflict(_) => AppError::Conflict("Username already exists.".to_string()),
        other => other,
    })
}

pub async fn update(pool: &PgPool, id: i64, patch: &UserPatch) -> AppResult<UserRow> {
    if patch.is_empty() {
        return get(pool, id).await;
    }

    let mut query = QueryBuilder::<Postgres>::new("UPDATE users SET ");
    {
        let mut fields = query.separated(", ");
        if let Some(username) = &patch.username {
            fields.push("username = ");
            fields.push_bind_unseparated(username.clone());
        }
        if let Some(currency) = &patch.currency {
            fields.push("currency = ");
            fields.push_bind_unseparated(currency.clone());
        }
        if let Some(password_hash) = &patch.password_hash {
            fields.push("password_hash = ");
            fields.push_bind_unseparated(password_hash.clone());
        }
    }
    query.push(" WHERE id = ").push_bind(id);
    query.push(&format!(" RETURNING {COLUMNS}"));

    query
        .build_query_as::<UserRow>()
        .fetch_optional(pool)
        .await
        .map_err(|error| match map_db_error(error) {
            AppError::Conflict(_) => AppError::Conflict("Username already exists.".to_string()),
            other => other,
        })?
        .ok_or_else(not_found)
}

fn not_found() -> AppError {
    AppError::NotFound("User not found.".to_string())
}
