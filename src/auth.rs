use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::repository::{sessions, users::UserRow};
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session_token";

/// Uniform for unknown-username and wrong-password failures so the login
/// endpoint cannot be used to enumerate usernames.
pub const INVALID_CREDENTIALS: &str = "Invalid username or password.";

/// Resolves the session cookie to an account, or rejects with 401.
/// Handlers receive the resolved user explicitly; there is no ambient
/// "current user" state.
pub async fn require_user(state: &AppState, headers: &HeaderMap) -> AppResult<UserRow> {
    current_user(state, headers)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Not authenticated.".to_string()))
}

/// Like [`require_user`] but a missing or stale session is a normal
/// negative result, not an error.
pub async fn current_user(state: &AppState, headers: &HeaderMap) -> AppResult<Option<UserRow>> {
    let Some(token) = session_token_from_headers(headers) else {
        return Ok(None);
    };
    sessions::find_user(&state.db_pool, token, state.config.session_ttl_days).await
}

pub fn session_token_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(parse_session_token)
}

fn parse_session_token(cookie_header: &str) -> Option<Uuid> {
    cookie_header.split(';').find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        if name.trim() != SESSION_COOKIE {
            return None;
        }
        Uuid::parse_str(value.trim()).ok()
    })
}

pub fn session_cookie(config: &AppConfig, token: Uuid) -> String {
    let max_age = config.session_ttl_days * 24 * 60 * 60;
    let mut cookie =
        format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if config.is_production() {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_session_cookie(config: &AppConfig) -> String {
    let mut cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.is_production() {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn hash_password(password: &str) -> AppResult<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|_| AppError::Internal("Could not hash password.".to_string()))
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    bcrypt::verify(password, password_hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::{parse_session_token, SESSION_COOKIE};
    use uuid::Uuid;

    #[test]
    fn parses_session_token_from_cookie_header() {
        let token = Uuid::new_v4();
        let header = format!("theme=dark; {SESSION_COOKIE}={token}; lang=en");
        assert_eq!(parse_session_token(&header), Some(token));
    }

    #[test]
    fn ignores_malformed_and_foreign_cookies() {
        assert_eq!(parse_session_token("theme=dark; lang=en"), None);
        assert_eq!(
            parse_session_token(&format!("{SESSION_COOKIE}=not-a-uuid")),
            None
        );
        assert_eq!(parse_session_token(""), None);
    }

    #[test]
    fn verifies_hashed_passwords() {
        let hash = super::hash_password("hunter2").expect("hash");
        assert!(super::verify_password("hunter2", &hash));
        assert!(!super::verify_password("hunter3", &hash));
        assert!(!super::verify_password("hunter2", "not-a-hash"));
    }
}
