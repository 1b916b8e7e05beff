/// List-sharing grants
///
/// A sharing row gives a non-owner read/write access to a list. Owners
/// are never recorded here; ownership already grants everything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A sharing grant
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Sharing {
    /// The shared list
    pub list_id: Uuid,

    /// The user granted access
    pub user_id: Uuid,

    pub created_at: DateTime<Utc>,
}

impl Sharing {
    /// Grants a user access to a list
    ///
    /// Re-sharing an already shared list is a no-op.
    pub async fn create(pool: &PgPool, list_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO sharings (list_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (list_id, user_id) DO NOTHING
            "#,
        )
        .bind(list_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Revokes a user's access to a list
    ///
    /// Returns false if no grant existed.
    pub async fn remove(pool: &PgPool, list_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sharings WHERE list_id = $1 AND user_id = $2")
            .bind(list_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether a grant exists
    pub async fn exists(pool: &PgPool, list_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let found: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM sharings WHERE list_id = $1 AND user_id = $2)",
        )
        .bind(list_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(found)
    }
}
