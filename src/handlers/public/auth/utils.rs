// handlers/public/auth/utils.rs - Shared helpers for credential endpoints

use axum::http::HeaderValue;

use crate::auth::ACCESS_TOKEN_COOKIE;
use crate::reports::ValidationError;

/// Syntactic email check: one `@`, a non-empty local part and a dotted domain.
pub fn validate_email(field: &str, email: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::new(field, "value is not a valid email address");
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }
    Ok(())
}

/// `Set-Cookie` value carrying a freshly issued access token.
pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> Option<HeaderValue> {
    let mut cookie = format!(
        "{}={}; HttpOnly; Max-Age={}; Path=/; SameSite=Lax",
        ACCESS_TOKEN_COOKIE, token, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).ok()
}

/// `Set-Cookie` value that expires the access-token cookie.
pub fn cleared_cookie(secure: bool) -> HeaderValue {
    if secure {
        HeaderValue::from_static("access_token=; HttpOnly; Max-Age=0; Path=/; SameSite=Lax; Secure")
    } else {
        HeaderValue::from_static("access_token=; HttpOnly; Max-Age=0; Path=/; SameSite=Lax")
    }
}
