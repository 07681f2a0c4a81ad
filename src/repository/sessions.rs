use sqlx::PgPool;
use uuid::Uuid;

use super::map_db_error;
use super::users::UserRow;
use crate::error::AppResult;

pub async fn create(pool: &PgPool, user_id: i64) -> AppResult<Uuid> {
    let token = Uuid::new_v4();
    sqlx::query("INSERT INTO sessions (token, user_id) VALUES ($1, $2)")
        .bind(token)
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(map_db_error)?;
    Ok(token)
}

/// Resolves a session token to its user, ignoring sessions older than the
/// configured TTL. Expired rows are left for the next login to replace.
pub async fn find_user(pool: &PgPool, token: Uuid, ttl_days: i64) -> AppResult<Option<UserRow>> {
    sqlx::query_as::<_, UserRow>(
        "SELECT u.id, u.username, u.password_hash, u.currency \
         FROM sessions s \
         JOIN users u ON u.id = s.user_id \
         WHERE s.token = $1 AND s.created_at > now() - make_interval(days => $2)",
    )
    .bind(token)
    .bind(ttl_days as i32)
    .fetch_optional(pool)
    .await
    .map_err(map_db_error)
}

/// Deleting an absent token is not an error; logout is idempotent.
pub async fn delete(pool: &PgPool, token: Uuid) -> AppResult<()> {
    sqlx::query("DELETE FROM sessions WHERE token = $1")
        .bind(token)
        .execute(pool)
        .await
        .map_err(map_db_error)?;
    Ok(())
}
