use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use crate::auth::{
    clear_session_cookie, current_user, hash_password, require_user, session_cookie,
    session_token_from_headers, verify_password, INVALID_CREDENTIALS,
};
use crate::error::{AppError, AppResult};
use crate::repository::users::{self, UserPatch, UserProfile};
use crate::repository::sessions;
use crate::schemas::{validate_input, LoginInput, RegisterInput, UpdateProfileInput};
use crate::state::AppState;

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/register", axum::routing::post(register))
        .route("/login", axum::routing::post(login))
        .route("/check_session", axum::routing::get(check_session))
        .route("/logout", axum::routing::delete(logout))
        .route(
            "/profile",
            axum::routing::get(get_profile).patch(update_profile),
        )
}

/// Creates the account and signs it in with one call.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterInput>,
) -> AppResult<impl IntoResponse> {
    validate_input(&payload)?;

    let password_hash = hash_password(&payload.password)?;
    let user = users::create(&state.db_pool, &payload.username, &password_hash).await?;
    let token = sessions::create(&state.db_pool, user.id).await?;

    tracing::info!(user_id = user.id, "account registered");
    Ok((
        StatusCode::CREATED,
        [(SET_COOKIE, session_cookie(&state.config, token))],
        Json(json!(UserProfile::from(user))),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginInput>,
) -> AppResult<impl IntoResponse> {
    // Unknown username and wrong password fail identically.
    let user = users::find_by_username(&state.db_pool, &payload.username)
        .await?
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;
    if !verify_password(&payload.password, &user.password_hash) {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let token = sessions::create(&state.db_pool, user.id).await?;
    tracing::info!(user_id = user.id, "login");
    Ok((
        [(SET_COOKIE, session_cookie(&state.config, token))],
        Json(json!(UserProfile::from(user))),
    ))
}

/// 200 with the profile for a live session, 204 otherwise. An absent or
/// stale cookie is an expected state here, not an authorization failure.
async fn check_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    match current_user(&state, &headers).await? {
        Some(user) => Ok(Json(json!(UserProfile::from(user))).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// A request with no session cookie at all is rejected like any other
/// unauthenticated call; a present-but-stale token still logs out cleanly,
/// so repeating the call is not an error.
async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let token = session_token_from_headers(&headers)
        .ok_or_else(|| AppError::Unauthorized("Not authenticated.".to_string()))?;
    sessions::delete(&state.db_pool, token).await?;
    Ok((
        StatusCode::NO_CONTENT,
        [(SET_COOKIE, clear_session_cookie(&state.config))],
    ))
}

async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    let user = require_user(&state, &headers).await?;
    Ok(Json(json!(UserProfile::from(user))))
}

/// A password change only goes through when the stored hash verifies the
/// supplied current password; a missing or wrong current password is an
/// authentication failure, not a shape error.
fn hashed_password_change(
    payload: &UpdateProfileInput,
    stored_hash: &str,
) -> AppResult<Option<String>> {
    let Some(new_password) = payload.new_password.as_deref() else {
        return Ok(None);
    };
    if new_password.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "New password must not be empty.".to_string(),
        ));
    }
    let current = payload.current_password.as_deref().ok_or_else(|| {
        AppError::Unauthorized("Current password is required to set a new one.".to_string())
    })?;
    if !verify_password(current, stored_hash) {
        return Err(AppError::Unauthorized(
            "Current password is incorrect.".to_string(),
        ));
    }
    Ok(Some(hash_password(new_password)?))
}

async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<UpdateProfileInput>,
) -> AppResult<Json<Value>> {
    let user = require_user(&state, &headers).await?;
    validate_input(&payload)?;

    let patch = UserPatch {
        username: payload.username.clone(),
        currency: payload.currency.clone(),
        password_hash: hashed_password_change(&payload, &user.password_hash)?,
    };

    let updated = users::update(&state.db_pool, user.id, &patch).await?;
    tracing::info!(user_id = updated.id, "profile updated");
    Ok(Json(json!(UserProfile::from(updated))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use crate::config::AppConfig;
    use sqlx::postgres::PgPoolOptions;

    fn profile_input(new_password: Option<&str>, current_password: Option<&str>) -> UpdateProfileInput {
        UpdateProfileInput {
            username: None,
            currency: None,
            new_password: new_password.map(ToOwned::to_owned),
            current_password: current_password.map(ToOwned::to_owned),
        }
    }

    #[test]
    fn password_change_requires_verified_current_password() {
        let stored = hash_password("hunter2").expect("hash");

        assert!(matches!(
            hashed_password_change(&profile_input(Some("newpass"), None), &stored),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            hashed_password_change(&profile_input(Some("newpass"), Some("wrong")), &stored),
            Err(AppError::Unauthorized(_))
        ));

        let changed = hashed_password_change(&profile_input(Some("newpass"), Some("hunter2")), &stored)
            .expect("change accepted")
            .expect("new hash issued");
        assert!(crate::auth::verify_password("newpass", &changed));
    }

    #[test]
    fn profile_patch_without_password_leaves_hash_alone() {
        let stored = hash_password("hunter2").expect("hash");
        let unchanged = hashed_password_change(&profile_input(None, None), &stored).expect("ok");
        assert!(unchanged.is_none());

        assert!(matches!(
            hashed_password_change(&profile_input(Some(""), Some("hunter2")), &stored),
            Err(AppError::UnprocessableEntity(_))
        ));
    }

    #[tokio::test]
    async fn logout_without_cookie_is_unauthorized() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .expect("lazy pool");
        let state = AppState::new(AppConfig::from_env(), pool);

        let result = logout(State(state), HeaderMap::new()).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }
}
