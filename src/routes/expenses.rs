use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use crate::auth::require_user;
use crate::error::AppResult;
use crate::repository::expenses;
use crate::schemas::{validate_input, CreateExpenseInput, UpdateExpenseInput};
use crate::state::AppState;

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/expenses",
            axum::routing::get(list_expenses).post(create_expense),
        )
        .route(
            "/expenses/{id}",
            axum::routing::get(get_expense)
                .patch(update_expense)
                .delete(delete_expense),
        )
}

async fn list_expenses(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    require_user(&state, &headers).await?;
    let rows = expenses::list(&state.db_pool).await?;
    Ok(Json(json!(rows)))
}

async fn get_expense(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    require_user(&state, &headers).await?;
    let row = expenses::get(&state.db_pool, id).await?;
    Ok(Json(json!(row)))
}

async fn create_expense(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateExpenseInput>,
) -> AppResult<impl IntoResponse> {
    require_user(&state, &headers).await?;
    validate_input(&payload)?;
    let created = expenses::create(&state.db_pool, &payload).await?;
    tracing::info!(expense_id = created.id, property_id = created.property_id, "expense recorded");
    Ok((StatusCode::CREATED, Json(json!(created))))
}

async fn update_expense(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(payload): Json<UpdateExpenseInput>,
) -> AppResult<Json<Value>> {
    require_user(&state, &headers).await?;
    validate_input(&payload)?;
    let updated = expenses::update(&state.db_pool, id, &payload).await?;
    Ok(Json(json!(updated)))
}

async fn delete_expense(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> AppResult<StatusCode> {
    require_user(&state, &headers).await?;
    expenses::delete(&state.db_pool, id).await?;
    tracing::info!(expense_id = id, "expense deleted");
    Ok(StatusCode::NO_CONTENT)
}
