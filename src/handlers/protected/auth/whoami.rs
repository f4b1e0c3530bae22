// handlers/protected/auth/whoami.rs - GET /auth/me handler

use axum::Extension;

use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

/// GET /auth/me - the user resolved from the request's token
pub async fn whoami_get(Extension(CurrentUser(user)): Extension<CurrentUser>) -> ApiResult<User> {
    Ok(ApiResponse::success(user))
}
