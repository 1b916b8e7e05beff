/// Credential sign-in with failed-attempt lockout
///
/// The sign-in coordinator is the single path for password authentication.
/// It deliberately reports unknown emails and wrong passwords as the same
/// outcome so callers cannot enumerate accounts, and it tracks failed
/// attempts on the user row: after [`MAX_FAILED_ATTEMPTS`] consecutive
/// failures the account is locked for [`LOCKOUT_MINUTES`], during which
/// even the correct password is rejected as [`SignInOutcome::LockedOut`].

use sqlx::PgPool;

use super::password::{verify_password, PasswordError};
use crate::models::user::User;

/// Consecutive failures before an account locks
pub const MAX_FAILED_ATTEMPTS: i32 = 5;

/// How long a locked account stays locked
pub const LOCKOUT_MINUTES: i64 = 5;

/// Error type for sign-in operations
#[derive(Debug, thiserror::Error)]
pub enum SignInError {
    /// Store operation failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored hash could not be processed
    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Outcome of a sign-in attempt
#[derive(Debug)]
pub enum SignInOutcome {
    /// Credentials valid; carries the (refreshed) user row
    Success(User),

    /// Account is locked out from too many failed attempts
    LockedOut,

    /// Unknown email or wrong password; indistinguishable on purpose
    InvalidCredentials,
}

/// Validates credentials for a user, enforcing lockout
///
/// With `lockout_on_failure` set, a wrong password counts toward the
/// lockout threshold; a successful sign-in resets the counter, clears any
/// stale lockout, and stamps the last-login time.
pub async fn password_sign_in(
    pool: &PgPool,
    email: &str,
    password: &str,
    lockout_on_failure: bool,
) -> Result<SignInOutcome, SignInError> {
    let Some(user) = User::find_by_email(pool, email).await? else {
        return Ok(SignInOutcome::InvalidCredentials);
    };

    if user.is_locked_out() {
        tracing::debug!(user_id = %user.id, "Sign-in rejected: account locked");
        return Ok(SignInOutcome::LockedOut);
    }

    if verify_password(password, &user.password_hash)? {
        let user = User::record_successful_login(pool, user.id)
            .await?
            .unwrap_or(user);
        return Ok(SignInOutcome::Success(user));
    }

    if lockout_on_failure {
        let locked = User::record_failed_login(pool, user.id).await?;
        if locked {
            tracing::info!(user_id = %user.id, "Account locked after repeated sign-in failures");
        }
    }

    Ok(SignInOutcome::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn user_with_lockout(lockout_until: Option<chrono::DateTime<Utc>>) -> User {
        User {
            id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            username: "user@example.com".to_string(),
            email_confirmed: false,
            password_hash: "$argon2id$irrelevant".to_string(),
            failed_login_count: 0,
            lockout_until,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        }
    }

    #[test]
    fn test_lockout_window() {
        let active = user_with_lockout(Some(Utc::now() + Duration::minutes(3)));
        assert!(active.is_locked_out());

        let elapsed = user_with_lockout(Some(Utc::now() - Duration::minutes(1)));
        assert!(!elapsed.is_locked_out());

        let never = user_with_lockout(None);
        assert!(!never.is_locked_out());
    }

    // Full sign-in paths (counter increments, lock trip, reset on success)
    // are exercised by the API integration tests against a live database.
}
