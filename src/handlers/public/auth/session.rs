// handlers/public/auth/session.rs - POST /auth/login and POST /auth/logout handlers

use axum::extract::{rejection::FormRejection, State};
use axum::http::header;
use axum::Form;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::utils::{cleared_cookie, session_cookie};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// OAuth2 password-style form; `username` carries the email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(alias = "email")]
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

const LOGIN_FAILED: &str = "Incorrect email or password";

/// POST /auth/login - verify credentials, return a bearer token and set the session cookie
pub async fn login_post(
    State(state): State<AppState>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> ApiResult<TokenResponse> {
    let Form(form) = form?;
    let user = state.users().find_by_email(&form.username).await?;

    let hasher = state.passwords;
    let stored_hash = user.as_ref().map(|u| u.hashed_password.clone());
    let password = form.password;
    // Unknown emails still pay for one bcrypt round so timing does not reveal registration.
    let verified = tokio::task::spawn_blocking(move || match stored_hash {
        Some(hash) => hasher.verify(&password, &hash),
        None => {
            let _ = hasher.hash(&password);
            false
        }
    })
    .await
    .map_err(|e| {
        tracing::error!("Password verification task failed: {}", e);
        ApiError::internal_server_error("An error occurred while processing your request")
    })?;

    let user = match user {
        Some(user) if verified => user,
        _ => {
            debug!("Failed login attempt");
            return Err(ApiError::unauthorized(LOGIN_FAILED));
        }
    };

    let token = state.tokens.issue(&user.email)?;
    let expires_in = state.tokens.default_ttl().num_seconds();
    let cookie = session_cookie(&token, expires_in, state.config.security.cookie_secure)
        .ok_or_else(|| ApiError::internal_server_error("An error occurred while processing your request"))?;

    info!("User {} logged in", user.email);
    Ok(ApiResponse::success(TokenResponse {
        access_token: token,
        token_type: "bearer",
        expires_in,
    })
    .with_header(header::SET_COOKIE, cookie))
}

/// POST /auth/logout - expire the session cookie. Bearer tokens stay valid until expiry.
pub async fn logout_post(State(state): State<AppState>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({ "message": "Successfully logged out" }))
        .with_header(header::SET_COOKIE, cleared_cookie(state.config.security.cookie_secure)))
}
