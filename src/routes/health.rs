use std::time::Duration;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::state::AppState;

const DB_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

pub fn router() -> axum::Router<AppState> {
    axum::Router::new().route("/health", axum::routing::get(health))
}

/// Liveness plus a bounded database probe. The endpoint itself stays 200
/// when the database is unreachable; the payload carries the detail.
async fn health(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let db_status = match tokio::time::timeout(
        DB_PROBE_TIMEOUT,
        sqlx::query("SELECT 1").execute(&state.db_pool),
    )
    .await
    {
        Ok(Ok(_)) => "ok",
        Ok(Err(error)) => {
            tracing::warn!(%error, "health probe query failed");
            "error"
        }
        Err(_) => {
            tracing::warn!("health probe timed out");
            "timeout"
        }
    };

    Ok(Json(json!({
        "status": "ok",
        "app": state.config.app_name,
        "environment": state.config.environment,
        "database": db_status,
    })))
}
