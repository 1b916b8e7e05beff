/// User model and database operations
///
/// The email address doubles as the username; both columns are kept in
/// sync by [`User::change_email`], which updates them in one statement so
/// a partial failure can never leave them mismatched. Lockout state lives
/// directly on the row (`failed_login_count`, `lockout_until`) and is
/// driven by the sign-in coordinator.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email CITEXT NOT NULL UNIQUE,
///     username CITEXT NOT NULL,
///     email_confirmed BOOLEAN NOT NULL DEFAULT FALSE,
///     password_hash VARCHAR(255) NOT NULL,
///     failed_login_count INTEGER NOT NULL DEFAULT 0,
///     lockout_until TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::signin::{LOCKOUT_MINUTES, MAX_FAILED_ATTEMPTS};

// email/username are CITEXT; cast to text for a clean String decode.
const USER_COLUMNS: &str = "id, email::text AS email, username::text AS username, \
     email_confirmed, password_hash, failed_login_count, lockout_until, \
     created_at, updated_at, last_login_at";

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Email address (unique, case-insensitive via CITEXT)
    pub email: String,

    /// Username; always kept equal to the email
    pub username: String,

    /// Set once the confirmation code has been redeemed
    pub email_confirmed: bool,

    /// Argon2id password hash (PHC string)
    pub password_hash: String,

    /// Consecutive failed sign-in attempts since the last success
    pub failed_login_count: i32,

    /// Account is locked until this instant (None = not locked)
    pub lockout_until: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Last successful sign-in (None if never signed in)
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Email address; also becomes the username
    pub email: String,

    /// Argon2id hash, never a plaintext password
    pub password_hash: String,
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Fails with a unique-constraint violation if the email is taken.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, username, password_hash)
            VALUES ($1, $1, $2)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(data.email)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email (case-insensitive)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1",
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// All usernames, oldest account first
    pub async fn list_usernames(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        let names: Vec<(String,)> =
            sqlx::query_as("SELECT username::text FROM users ORDER BY created_at")
                .fetch_all(pool)
                .await?;

        Ok(names.into_iter().map(|(name,)| name).collect())
    }

    /// Marks the email address as confirmed
    ///
    /// Returns false if the user does not exist.
    pub async fn confirm_email(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET email_confirmed = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Changes email and username together
    ///
    /// Both columns move in a single statement; there is no window where
    /// they disagree.
    ///
    /// # Errors
    ///
    /// Fails with a unique-constraint violation if the new email is taken.
    pub async fn change_email(
        pool: &PgPool,
        id: Uuid,
        new_email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET email = $2, username = $2, email_confirmed = FALSE, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(new_email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Replaces the password hash and clears any lockout
    pub async fn set_password_hash(
        pool: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2,
                failed_login_count = 0,
                lockout_until = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Records a failed sign-in attempt
    ///
    /// Increments the failure counter; on reaching the threshold the
    /// account locks for [`LOCKOUT_MINUTES`] and the counter resets.
    /// Returns true when this attempt tripped the lock.
    pub async fn record_failed_login(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let locked: Option<(bool,)> = sqlx::query_as(
            r#"
            UPDATE users
            SET failed_login_count = CASE
                    WHEN failed_login_count + 1 >= $2 THEN 0
                    ELSE failed_login_count + 1
                END,
                lockout_until = CASE
                    WHEN failed_login_count + 1 >= $2 THEN NOW() + make_interval(mins => $3)
                    ELSE lockout_until
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING failed_login_count = 0
            "#,
        )
        .bind(id)
        .bind(MAX_FAILED_ATTEMPTS)
        .bind(LOCKOUT_MINUTES as i32)
        .fetch_optional(pool)
        .await?;

        Ok(locked.map(|(tripped,)| tripped).unwrap_or(false))
    }

    /// Records a successful sign-in
    ///
    /// Resets the failure counter, clears any stale lockout, and stamps
    /// the last-login time. Returns the refreshed row.
    pub async fn record_successful_login(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET failed_login_count = 0,
                lockout_until = NULL,
                last_login_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Deletes a user and (via cascades) their lists, sharings, and codes
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether the account is currently locked out
    pub fn is_locked_out(&self) -> bool {
        match self.lockout_until {
            Some(until) => until > Utc::now(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn base_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            username: "test@example.com".to_string(),
            email_confirmed: false,
            password_hash: "hash".to_string(),
            failed_login_count: 0,
            lockout_until: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        }
    }

    #[test]
    fn test_is_locked_out() {
        let mut user = base_user();
        assert!(!user.is_locked_out());

        user.lockout_until = Some(Utc::now() + Duration::minutes(5));
        assert!(user.is_locked_out());

        user.lockout_until = Some(Utc::now() - Duration::seconds(1));
        assert!(!user.is_locked_out());
    }

    #[test]
    fn test_create_user_struct() {
        let create_user = CreateUser {
            email: "test@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
        };

        assert_eq!(create_user.email, "test@example.com");
    }

    // Row-level operations are exercised by the API integration tests.
}
