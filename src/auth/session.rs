// Session token creation and verification
// The session is a signed token stored in the `session` cookie

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "session";

/// Errors raised while issuing or reading a session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid session token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// Session claims
///
/// # Fields
/// * `openid` - Federated identity the session was opened for
/// * `exp` - Expiry time (seconds since epoch)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub openid: String,
    pub exp: usize,
}

/// Creates a session token for a federated identity
///
/// # Example
/// ```
/// use webfaf::auth::session::{create_session_token, verify_session_token};
///
/// let token = create_session_token("https://jdoe.id.fedoraproject.org/", "key", 8)
///     .expect("valid token");
/// let claims = verify_session_token(&token, "key").expect("valid session");
/// assert_eq!(claims.openid, "https://jdoe.id.fedoraproject.org/");
/// ```
pub fn create_session_token(openid: &str, secret: &str, ttl_hours: i64) -> Result<String, SessionError> {
    let expiry = Utc::now() + Duration::hours(ttl_hours);
    let claims = SessionClaims {
        openid: openid.to_string(),
        exp: expiry.timestamp().max(0) as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

/// Verifies and decodes a session token
pub fn verify_session_token(token: &str, secret: &str) -> Result<SessionClaims, SessionError> {
    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}
