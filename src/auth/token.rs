use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Signing algorithm for every token this deployment issues or accepts.
const ALGORITHM: Algorithm = Algorithm::HS256;

/// Claims carried by an access token. Nothing here is persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// The user's email address.
    pub sub: String,
    /// Absolute expiry, seconds since the Unix epoch.
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token subject must not be empty")]
    EmptySubject,

    #[error("token encoding failed: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
}

/// Issues and verifies stateless HS256 access tokens.
///
/// The secret and algorithm are fixed at construction; neither is read from
/// the token being verified.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], default_ttl: Duration) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked in `verify_at` against an explicit clock, with no leeway.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Issues a token for `subject` using the configured lifetime.
    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_with_ttl(subject, self.default_ttl)
    }

    pub fn issue_with_ttl(&self, subject: &str, ttl: Duration) -> Result<String, TokenError> {
        self.issue_at(subject, ttl, Utc::now())
    }

    pub fn issue_at(&self, subject: &str, ttl: Duration, now: DateTime<Utc>) -> Result<String, TokenError> {
        if subject.is_empty() {
            return Err(TokenError::EmptySubject);
        }
        let claims = Claims {
            sub: subject.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };
        Ok(encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)?)
    }

    /// Returns the subject of a valid, unexpired token.
    ///
    /// Every failure collapses to `None` so callers cannot tell a forged
    /// token from an expired one.
    pub fn verify(&self, token: &str) -> Option<String> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Option<String> {
        let data = match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!("Rejected access token: {}", e);
                return None;
            }
        };

        let claims = data.claims;
        if claims.exp <= now.timestamp() {
            tracing::debug!("Rejected expired access token");
            return None;
        }
        if claims.sub.is_empty() {
            return None;
        }
        Some(claims.sub)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &ALGORITHM)
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service() -> TokenService {
        TokenService::new(b"test-secret", Duration::days(7))
    }

    #[test]
    fn verifies_before_expiry() {
        let tokens = service();
        let now = Utc::now();
        let token = tokens.issue_at("a@x.com", Duration::minutes(30), now).unwrap();

        assert_eq!(tokens.verify_at(&token, now).as_deref(), Some("a@x.com"));
        assert_eq!(
            tokens.verify_at(&token, now + Duration::minutes(29)).as_deref(),
            Some("a@x.com")
        );
    }

    #[test]
    fn rejects_at_and_after_expiry() {
        let tokens = service();
        let now = Utc::now();
        let token = tokens.issue_at("a@x.com", Duration::minutes(30), now).unwrap();

        assert_eq!(tokens.verify_at(&token, now + Duration::minutes(30)), None);
        assert_eq!(tokens.verify_at(&token, now + Duration::days(1)), None);
    }

    #[test]
    fn default_issue_uses_configured_ttl() {
        let tokens = service();
        let token = tokens.issue("a@x.com").unwrap();
        assert_eq!(tokens.verify(&token).as_deref(), Some("a@x.com"));
        assert_eq!(tokens.verify_at(&token, Utc::now() + Duration::days(8)), None);
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let ours = service();
        let theirs = TokenService::new(b"another-secret", Duration::days(7));
        let token = theirs.issue("a@x.com").unwrap();

        assert_eq!(ours.verify(&token), None);
    }

    #[test]
    fn rejects_other_algorithm() {
        let tokens = service();
        let claims = Claims {
            sub: "a@x.com".to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
            iat: Utc::now().timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert_eq!(tokens.verify(&token), None);
    }

    #[test]
    fn rejects_missing_or_empty_subject() {
        let tokens = service();
        let key = EncodingKey::from_secret(b"test-secret");
        let exp = (Utc::now() + Duration::hours(1)).timestamp();

        let no_sub = encode(&Header::new(ALGORITHM), &json!({ "exp": exp }), &key).unwrap();
        assert_eq!(tokens.verify(&no_sub), None);

        let empty_sub = encode(&Header::new(ALGORITHM), &json!({ "sub": "", "exp": exp, "iat": 0 }), &key).unwrap();
        assert_eq!(tokens.verify(&empty_sub), None);
    }

    #[test]
    fn rejects_garbage() {
        let tokens = service();
        assert_eq!(tokens.verify(""), None);
        assert_eq!(tokens.verify("not.a.token"), None);
        assert!(matches!(tokens.issue(""), Err(TokenError::EmptySubject)));
    }
}
