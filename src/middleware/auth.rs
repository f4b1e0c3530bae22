use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::auth::{resolve_identity, IdentityError};
use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user, inserted into request extensions by [`require_user`]
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Resolve the caller from the bearer header or access-token cookie, or reject with 401
pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = match resolve_identity(request.headers(), &state.tokens, &state.users()).await {
        Ok(user) => user,
        Err(IdentityError::Unauthenticated) => {
            debug!("Rejected unauthenticated request to {}", request.uri().path());
            return Err(IdentityError::Unauthenticated.into());
        }
        Err(e) => return Err(e.into()),
    };

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}
