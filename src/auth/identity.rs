use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use thiserror::Error;

use super::token::TokenService;
use crate::database::models::User;
use crate::database::DatabaseError;

/// Name of the cookie carrying the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Lookup seam for the identity resolver.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
}

#[derive(Debug, Error)]
pub enum IdentityError {
    /// Missing, invalid or expired token, or a subject that no longer exists.
    #[error("Could not validate credentials")]
    Unauthenticated,

    #[error(transparent)]
    Lookup(#[from] DatabaseError),
}

/// Token from `Authorization: Bearer`, else from the access-token cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    bearer_token(headers).or_else(|| cookie_token(headers))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == ACCESS_TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Resolve the request's headers to a stored user.
///
/// Every authentication failure collapses to [`IdentityError::Unauthenticated`];
/// only a failing lookup is reported separately.
pub async fn resolve_identity<D>(
    headers: &HeaderMap,
    tokens: &TokenService,
    directory: &D,
) -> Result<User, IdentityError>
where
    D: UserDirectory + ?Sized,
{
    let token = extract_token(headers).ok_or(IdentityError::Unauthenticated)?;
    let email = tokens.verify(&token).ok_or(IdentityError::Unauthenticated)?;
    directory
        .find_by_email(&email)
        .await?
        .ok_or(IdentityError::Unauthenticated)
}
