use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use crate::auth::require_user;
use crate::error::AppResult;
use crate::repository::properties;
use crate::schemas::{validate_input, CreatePropertyInput, UpdatePropertyInput};
use crate::state::AppState;

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/properties",
            axum::routing::get(list_properties).post(create_property),
        )
        .route(
            "/properties/{id}",
            axum::routing::get(get_property)
                .patch(update_property)
                .delete(delete_property),
        )
}

async fn list_properties(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    require_user(&state, &headers).await?;
    let rows = properties::list(&state.db_pool).await?;
    Ok(Json(json!(rows)))
}

async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    require_user(&state, &headers).await?;
    let row = properties::get(&state.db_pool, id).await?;
    Ok(Json(json!(row)))
}

async fn create_property(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreatePropertyInput>,
) -> AppResult<impl IntoResponse> {
    require_user(&state, &headers).await?;
    validate_input(&payload)?;
    let created = properties::create(&state.db_pool, &payload).await?;
    tracing::info!(property_id = created.id, "property created");
    Ok((StatusCode::CREATED, Json(json!(created))))
}

async fn update_property(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(payload): Json<UpdatePropertyInput>,
) -> AppResult<Json<Value>> {
    require_user(&state, &headers).await?;
    validate_input(&payload)?;
    let updated = properties::update(&state.db_pool, id, &payload).await?;
    Ok(Json(json!(updated)))
}

async fn delete_property(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> AppResult<StatusCode> {
    require_user(&state, &headers).await?;
    properties::delete(&state.db_pool, id).await?;
    tracing::info!(property_id = id, "property deleted");
    Ok(StatusCode::NO_CONTENT)
}
