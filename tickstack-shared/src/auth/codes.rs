/// One-time security codes
///
/// Email confirmation and password reset both hand the user a short-lived
/// code out of band (by email) and consume it on first use. Codes are
/// 32 random alphanumeric characters, stored as SHA-256 hex hashes so a
/// database leak does not expose live codes, and expire after 24 hours.
/// Issuing a new code for the same purpose replaces any outstanding one.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

/// Length of a plaintext security code (characters)
pub const CODE_LENGTH: usize = 32;

/// Code lifetime in hours
pub const CODE_LIFETIME_HOURS: i64 = 24;

/// What a security code is good for
///
/// One live code per user and purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "code_purpose", rename_all = "snake_case")]
pub enum CodePurpose {
    /// Confirms ownership of the registered email address
    EmailConfirmation,

    /// Authorizes a password reset
    PasswordReset,
}

impl CodePurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodePurpose::EmailConfirmation => "email_confirmation",
            CodePurpose::PasswordReset => "password_reset",
        }
    }
}

/// A stored (hashed) one-time code
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SecurityCode {
    /// User the code was issued to
    pub user_id: Uuid,

    /// What the code authorizes
    pub purpose: CodePurpose,

    /// SHA-256 hex of the plaintext code
    pub code_hash: String,

    /// When the code stops being accepted
    pub expires_at: DateTime<Utc>,

    /// When the code was issued
    pub created_at: DateTime<Utc>,
}

impl SecurityCode {
    /// Issues a fresh code for a user and purpose
    ///
    /// Replaces any outstanding code for the same purpose. Returns the
    /// plaintext code for delivery by email; only the hash is stored.
    pub async fn issue(
        pool: &PgPool,
        user_id: Uuid,
        purpose: CodePurpose,
    ) -> Result<String, sqlx::Error> {
        let (code, hash) = generate_code();
        let expires_at = Utc::now() + Duration::hours(CODE_LIFETIME_HOURS);

        sqlx::query(
            r#"
            INSERT INTO security_codes (user_id, purpose, code_hash, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, purpose)
            DO UPDATE SET code_hash = $3, expires_at = $4, created_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(purpose)
        .bind(hash)
        .bind(expires_at)
        .execute(pool)
        .await?;

        Ok(code)
    }

    /// Consumes a code: valid exactly once, and only before expiry
    ///
    /// Returns `true` if the presented code matched and was deleted,
    /// `false` for an unknown, wrong, or expired code. An expired row is
    /// removed either way.
    pub async fn consume(
        pool: &PgPool,
        user_id: Uuid,
        purpose: CodePurpose,
        presented: &str,
    ) -> Result<bool, sqlx::Error> {
        let stored = sqlx::query_as::<_, SecurityCode>(
            r#"
            SELECT user_id, purpose, code_hash, expires_at, created_at
            FROM security_codes
            WHERE user_id = $1 AND purpose = $2
            "#,
        )
        .bind(user_id)
        .bind(purpose)
        .fetch_optional(pool)
        .await?;

        let Some(stored) = stored else {
            return Ok(false);
        };

        if stored.expires_at <= Utc::now() {
            Self::delete(pool, user_id, purpose).await?;
            return Ok(false);
        }

        if !verify_code(presented, stored.code_hash.trim()) {
            return Ok(false);
        }

        Self::delete(pool, user_id, purpose).await?;
        Ok(true)
    }

    async fn delete(pool: &PgPool, user_id: Uuid, purpose: CodePurpose) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM security_codes WHERE user_id = $1 AND purpose = $2")
            .bind(user_id)
            .bind(purpose)
            .execute(pool)
            .await?;

        Ok(())
    }
}

/// Generates a new security code
///
/// Returns (plaintext_code, sha256_hex_hash).
pub fn generate_code() -> (String, String) {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    let code: String = (0..CODE_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect();

    let hash = hash_code(&code);
    (code, hash)
}

/// Hashes a code with SHA-256, hex-encoded
pub fn hash_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verifies a presented code against a stored hash in constant time
pub fn verify_code(presented: &str, stored_hash: &str) -> bool {
    constant_time_compare(&hash_code(presented), stored_hash)
}

/// Constant-time string comparison
///
/// Accumulates differences with bitwise OR instead of short-circuiting so
/// comparison time does not depend on where the strings diverge.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut result = 0u8;
    for i in 0..a_bytes.len() {
        result |= a_bytes[i] ^ b_bytes[i];
    }

    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_code() {
        let (code1, hash1) = generate_code();
        let (code2, hash2) = generate_code();

        assert_eq!(code1.len(), CODE_LENGTH);
        assert!(code1.chars().all(|c| c.is_alphanumeric()));

        assert_ne!(code1, code2);
        assert_ne!(hash1, hash2);

        // SHA-256 hex is 64 chars
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_hash_code_deterministic() {
        let hash1 = hash_code("some-code");
        let hash2 = hash_code("some-code");
        let hash3 = hash_code("other-code");

        assert_eq!(hash1, hash2);
        assert_ne!(hash1, hash3);
    }

    #[test]
    fn test_verify_code() {
        let (code, hash) = generate_code();

        assert!(verify_code(&code, &hash));
        assert!(!verify_code("definitely-not-the-code", &hash));
        assert!(!verify_code("", &hash));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(constant_time_compare("", ""));

        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hello2"));
        assert!(!constant_time_compare("short", "longer string"));
    }

    #[test]
    fn test_purpose_as_str() {
        assert_eq!(CodePurpose::EmailConfirmation.as_str(), "email_confirmation");
        assert_eq!(CodePurpose::PasswordReset.as_str(), "password_reset");
    }
}
