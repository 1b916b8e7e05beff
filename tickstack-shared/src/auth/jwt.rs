/// Bearer token generation and validation
///
/// Tokens are HS256-signed JWTs with a fixed one-day expiry. The signing
/// key, issuer, and audience all come from configuration. Claims are named
/// struct fields, so consumers look identity up by name (`uid`) rather
/// than by position in a claims list:
///
/// - `sub`: the user's email address
/// - `jti`: a fresh random token identifier
/// - `uid`: the user's store identifier
///
/// There is no refresh mechanism and no server-side revocation: a token is
/// valid until its expiry.
///
/// # Example
///
/// ```
/// use tickstack_shared::auth::jwt::{create_token, validate_token, Claims, TokenConfig};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = TokenConfig {
///     secret: "test-secret-key-at-least-32-bytes-long".into(),
///     issuer: "tickstack".into(),
///     audience: "tickstack-clients".into(),
/// };
///
/// let claims = Claims::new("user@example.com", Uuid::new_v4(), &config);
/// let token = create_token(&claims, &config)?;
///
/// let validated = validate_token(&token, &config)?;
/// assert_eq!(validated.sub, "user@example.com");
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token lifetime: one day
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Issuer or audience did not match configuration
    #[error("Token issuer or audience mismatch")]
    WrongConsumer,
}

/// Signing configuration sourced from the environment
///
/// The secret should be at least 32 bytes and generated randomly
/// (`openssl rand -hex 32`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Symmetric HS256 signing key
    pub secret: String,

    /// Value of the `iss` claim
    pub issuer: String,

    /// Value of the `aud` claim
    pub audience: String,
}

/// JWT claims
///
/// Named fields replace positional claim lookup: a consumer reads the
/// user identifier from `uid` regardless of serialization order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - the user's email address
    pub sub: String,

    /// Random token identifier
    pub jti: Uuid,

    /// The user's store identifier (custom claim)
    pub uid: Uuid,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims for a user with the fixed one-day expiry
    pub fn new(email: &str, user_id: Uuid, config: &TokenConfig) -> Self {
        let now = Utc::now();
        let expires = now + Duration::hours(TOKEN_LIFETIME_HOURS);

        Self {
            sub: email.to_string(),
            jti: Uuid::new_v4(),
            uid: user_id,
            iss: config.issuer.clone(),
            aud: config.audience.clone(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims into a bearer token
pub fn create_token(claims: &Claims, config: &TokenConfig) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(config.secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a bearer token and extracts its claims
///
/// Verifies the signature, expiry, issuer, and audience.
pub fn validate_token(token: &str, config: &TokenConfig) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(config.secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.issuer]);
    validation.set_audience(&[&config.audience]);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer
        | jsonwebtoken::errors::ErrorKind::InvalidAudience => JwtError::WrongConsumer,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
