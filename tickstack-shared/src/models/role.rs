/// Roles (FREE/PRO tiers) and user-role membership
///
/// Every registered user holds exactly one of the two tiers. The roles
/// themselves are seeded idempotently at startup; registration never
/// creates roles, it only resolves and assigns them. An unknown or empty
/// requested role silently falls back to FREE.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE roles (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name TEXT NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE user_roles (
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role_id UUID NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (user_id, role_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Name of the default tier
pub const FREE_ROLE: &str = "FREE";

/// Name of the paid tier
pub const PRO_ROLE: &str = "PRO";

/// Account tier derived from role membership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Free,
    Pro,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => FREE_ROLE,
            Tier::Pro => PRO_ROLE,
        }
    }
}

/// A named role
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Role {
    pub id: Uuid,

    /// Unique role name ("FREE", "PRO")
    pub name: String,

    pub created_at: DateTime<Utc>,
}

/// Picks the role a registration actually gets
///
/// The requested role wins only when it is non-empty and known to the
/// role store; everything else falls back to FREE.
pub fn effective_role(requested: Option<&str>, requested_exists: bool) -> &str {
    match requested {
        Some(name) if !name.trim().is_empty() && requested_exists => name,
        _ => FREE_ROLE,
    }
}

impl Role {
    /// Seeds the default FREE/PRO roles
    ///
    /// Idempotent: runs once at startup, and the unique index on `name`
    /// absorbs concurrent seeding from multiple instances.
    pub async fn seed_defaults(pool: &PgPool) -> Result<(), sqlx::Error> {
        for name in [FREE_ROLE, PRO_ROLE] {
            sqlx::query("INSERT INTO roles (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
                .bind(name)
                .execute(pool)
                .await?;
        }

        tracing::debug!("Default roles seeded");
        Ok(())
    }

    /// Whether a role with this name exists
    pub async fn exists(pool: &PgPool, name: &str) -> Result<bool, sqlx::Error> {
        let found: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM roles WHERE name = $1)")
                .bind(name)
                .fetch_one(pool)
                .await?;

        Ok(found)
    }

    /// Finds a role by name
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        let role = sqlx::query_as::<_, Role>(
            "SELECT id, name, created_at FROM roles WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(role)
    }

    /// Adds a user to a role by name
    ///
    /// Returns false if the role does not exist; re-adding an existing
    /// membership is a no-op.
    pub async fn add_user(pool: &PgPool, user_id: Uuid, role_name: &str) -> Result<bool, sqlx::Error> {
        let Some(role) = Self::find_by_name(pool, role_name).await? else {
            return Ok(false);
        };

        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role.id)
        .execute(pool)
        .await?;

        Ok(true)
    }

    /// Whether a user is a member of the named role
    pub async fn user_in_role(
        pool: &PgPool,
        user_id: Uuid,
        role_name: &str,
    ) -> Result<bool, sqlx::Error> {
        let found: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM user_roles ur
                JOIN roles r ON r.id = ur.role_id
                WHERE ur.user_id = $1 AND r.name = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(role_name)
        .fetch_one(pool)
        .await?;

        Ok(found)
    }

    /// Resolves the role a registration request should be assigned
    pub async fn resolve_registration_role(
        pool: &PgPool,
        requested: Option<&str>,
    ) -> Result<String, sqlx::Error> {
        let requested_exists = match requested {
            Some(name) if !name.trim().is_empty() => Self::exists(pool, name).await?,
            _ => false,
        };

        Ok(effective_role(requested, requested_exists).to_string())
    }

    /// The user's tier: PRO iff they hold the PRO role, else FREE
    pub async fn tier_for_user(pool: &PgPool, user_id: Uuid) -> Result<Tier, sqlx::Error> {
        if Self::user_in_role(pool, user_id, PRO_ROLE).await? {
            Ok(Tier::Pro)
        } else {
            Ok(Tier::Free)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_as_str() {
        assert_eq!(Tier::Free.as_str(), "FREE");
        assert_eq!(Tier::Pro.as_str(), "PRO");
    }

    #[test]
    fn test_effective_role_requested_and_known() {
        assert_eq!(effective_role(Some("PRO"), true), "PRO");
    }

    #[test]
    fn test_effective_role_unknown_falls_back() {
        // "ADMIN" is not a role the store knows about
        assert_eq!(effective_role(Some("ADMIN"), false), "FREE");
    }

    #[test]
    fn test_effective_role_empty_or_missing() {
        assert_eq!(effective_role(None, false), "FREE");
        assert_eq!(effective_role(Some(""), true), "FREE");
        assert_eq!(effective_role(Some("   "), true), "FREE");
    }
}
