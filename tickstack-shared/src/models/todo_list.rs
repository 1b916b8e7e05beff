/// To-do list model and database operations
///
/// A list belongs to one owner and may be shared with any number of other
/// users. Access checks never distinguish "list does not exist" from
/// "list exists but you are not a member"; both read as absent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A to-do list
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TodoList {
    /// Unique list ID
    pub id: Uuid,

    /// Owning user
    pub owner_id: Uuid,

    /// Display name
    pub name: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new list
#[derive(Debug, Clone)]
pub struct CreateTodoList {
    pub owner_id: Uuid,
    pub name: String,
}

impl TodoList {
    /// Creates a new list
    pub async fn create(pool: &PgPool, data: CreateTodoList) -> Result<Self, sqlx::Error> {
        let list = sqlx::query_as::<_, TodoList>(
            r#"
            INSERT INTO todo_lists (owner_id, name)
            VALUES ($1, $2)
            RETURNING id, owner_id, name, created_at, updated_at
            "#,
        )
        .bind(data.owner_id)
        .bind(data.name)
        .fetch_one(pool)
        .await?;

        Ok(list)
    }

    /// Finds a list by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let list = sqlx::query_as::<_, TodoList>(
            "SELECT id, owner_id, name, created_at, updated_at FROM todo_lists WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(list)
    }

    /// Lists visible to a user: owned plus shared, newest first
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let lists = sqlx::query_as::<_, TodoList>(
            r#"
            SELECT l.id, l.owner_id, l.name, l.created_at, l.updated_at
            FROM todo_lists l
            LEFT JOIN sharings s ON s.list_id = l.id AND s.user_id = $1
            WHERE l.owner_id = $1 OR s.user_id IS NOT NULL
            ORDER BY l.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(lists)
    }

    /// Deletes a list, owner only
    ///
    /// Returns false when the list is absent or not owned by the caller.
    pub async fn delete_owned(pool: &PgPool, id: Uuid, owner_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todo_lists WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of lists a user owns (quota input)
    pub async fn count_owned(pool: &PgPool, owner_id: Uuid) -> Result<i64, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM todo_lists WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Whether a user may read/write this list (owner or shared member)
    pub async fn user_can_access(
        pool: &PgPool,
        list_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let allowed: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM todo_lists WHERE id = $1 AND owner_id = $2
                UNION
                SELECT 1 FROM sharings WHERE list_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(list_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_list_struct() {
        let data = CreateTodoList {
            owner_id: Uuid::new_v4(),
            name: "Groceries".to_string(),
        };

        assert_eq!(data.name, "Groceries");
    }

    // Query behavior is exercised by the API integration tests.
}
