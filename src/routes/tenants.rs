use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use crate::auth::require_user;
use crate::error::AppResult;
use crate::repository::tenants;
use crate::schemas::{validate_input, CreateTenantInput, UpdateTenantInput};
use crate::state::AppState;

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/tenants",
            axum::routing::get(list_tenants).post(create_tenant),
        )
        .route(
            "/tenants/{id}",
            axum::routing::get(get_tenant)
                .patch(update_tenant)
                .delete(delete_tenant),
        )
}

async fn list_tenants(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Json<Value>> {
    require_user(&state, &headers).await?;
    let rows = tenants::list(&state.db_pool).await?;
    Ok(Json(json!(rows)))
}

async fn get_tenant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    require_user(&state, &headers).await?;
    let row = tenants::get(&state.db_pool, id).await?;
    Ok(Json(json!(row)))
}

async fn create_tenant(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateTenantInput>,
) -> AppResult<impl IntoResponse> {
    require_user(&state, &headers).await?;
    validate_input(&payload)?;
    let created = tenants::create(&state.db_pool, &payload).await?;
    tracing::info!(tenant_id = created.id, "tenant created");
    Ok((StatusCode::CREATED, Json(json!(created))))
}

async fn update_tenant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(payload): Json<UpdateTenantInput>,
) -> AppResult<Json<Value>> {
    require_user(&state, &headers).await?;
    validate_input(&payload)?;
    let updated = tenants::update(&state.db_pool, id, &payload).await?;
    Ok(Json(json!(updated)))
}

async fn delete_tenant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> AppResult<StatusCode> {
    require_user(&state, &headers).await?;
    tenants::delete(&state.db_pool, id).await?;
    tracing::info!(tenant_id = id, "tenant deleted");
    Ok(StatusCode::NO_CONTENT)
}
