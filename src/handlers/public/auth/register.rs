// handlers/public/auth/register.rs - POST /auth/register handler

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use super::utils::validate_email;
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::reports::ValidationError;
use crate::state::AppState;

pub const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/register - create an account; 201 with the stored user
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Json(request) = payload?;
    validate_email("email", &request.email)?;
    if request.password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ValidationError::new(
            "password",
            format!("String should have at least {} characters", MIN_PASSWORD_CHARS),
        )
        .into());
    }

    let users = state.users();
    if users.find_by_email(&request.email).await?.is_some() {
        return Err(ApiError::bad_request("Email already registered"));
    }

    let hasher = state.passwords;
    let password = request.password;
    let hashed = tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| {
            tracing::error!("Password hashing task failed: {}", e);
            ApiError::internal_server_error("An error occurred while processing your request")
        })??;

    // A concurrent registration can still win the race; the UNIQUE index reports it as a conflict.
    let user = users.create(&request.email, &hashed).await?;
    info!("Registered user {}", user.email);
    Ok(ApiResponse::created(user))
}
