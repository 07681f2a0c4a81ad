use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use crate::auth::require_user;
use crate::error::AppResult;
use crate::repository::payments;
use crate::schemas::{validate_input, CreatePaymentInput, UpdatePaymentInput};
use crate::state::AppState;

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/payments",
            axum::routing::get(list_payments).post(create_payment),
        )
        .route(
            "/payments/{id}",
            axum::routing::get(get_payment)
                .patch(update_payment)
                .delete(delete_payment),
        )
}

async fn list_payments(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    require_user(&state, &headers).await?;
    let rows = payments::list(&state.db_pool).await?;
    Ok(Json(json!(rows)))
}

async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    require_user(&state, &headers).await?;
    let row = payments::get(&state.db_pool, id).await?;
    Ok(Json(json!(row)))
}

async fn create_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreatePaymentInput>,
) -> AppResult<impl IntoResponse> {
    require_user(&state, &headers).await?;
    validate_input(&payload)?;
    let created = payments::create(&state.db_pool, &payload).await?;
    tracing::info!(payment_id = created.id, lease_id = created.lease_id, "payment recorded");
    Ok((StatusCode::CREATED, Json(json!(created))))
}

async fn update_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(payload): Json<UpdatePaymentInput>,
) -> AppResult<Json<Value>> {
    require_user(&state, &headers).await?;
    validate_input(&payload)?;
    let updated = payments::update(&state.db_pool, id, &payload).await?;
    Ok(Json(json!(updated)))
}

async fn delete_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> AppResult<StatusCode> {
    require_user(&state, &headers).await?;
    payments::delete(&state.db_pool, id).await?;
    tracing::info!(payment_id = id, "payment deleted");
    Ok(StatusCode::NO_CONTENT)
}
