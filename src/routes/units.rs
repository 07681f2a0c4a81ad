use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use crate::auth::require_user;
use crate::error::AppResult;
use crate::repository::units;
use crate::schemas::{validate_input, CreateUnitInput, UpdateUnitInput};
use crate::state::AppState;

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/units", axum::routing::get(list_units).post(create_unit))
        .route(
            "/units/{id}",
            axum::routing::get(get_unit)
                .patch(update_unit)
                .delete(delete_unit),
        )
}

async fn list_units(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Json<Value>> {
    require_user(&state, &headers).await?;
    let rows = units::list(&state.db_pool).await?;
    Ok(Json(json!(rows)))
}

async fn get_unit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    require_user(&state, &headers).await?;
    let row = units::get(&state.db_pool, id).await?;
    Ok(Json(json!(row)))
}

async fn create_unit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateUnitInput>,
) -> AppResult<impl IntoResponse> {
    require_user(&state, &headers).await?;
    validate_input(&payload)?;
    let created = units::create(&state.db_pool, &payload).await?;
    tracing::info!(unit_id = created.id, "unit created");
    Ok((StatusCode::CREATED, Json(json!(created))))
}

async fn update_unit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(payload): Json<UpdateUnitInput>,
) -> AppResult<Json<Value>> {
    require_user(&state, &headers).await?;
    validate_input(&payload)?;
    let updated = units::update(&state.db_pool, id, &payload).await?;
    Ok(Json(json!(updated)))
}

async fn delete_unit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> AppResult<StatusCode> {
    require_user(&state, &headers).await?;
    units::delete(&state.db_pool, id).await?;
    tracing::info!(unit_id = id, "unit deleted");
    Ok(StatusCode::NO_CONTENT)
}
