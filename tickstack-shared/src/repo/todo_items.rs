/// To-do item repository
///
/// [`TodoItemRepo`] is the contract every item store must satisfy: CRUD,
/// list-scoped queries (all/active/completed), a completion toggle, a bulk
/// list update, and a persistence flush. [`PgTodoItemRepo`] is the
/// PostgreSQL implementation; it writes through on every call, so its
/// `save` is a no-op kept for implementations that batch.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::todo_item::{CreateTodoItem, TodoItem, UpdateTodoItem};

const ITEM_COLUMNS: &str = "id, list_id, name, notes, completed, due_at, created_at, updated_at";

/// Contract for to-do item storage
#[async_trait]
pub trait TodoItemRepo: Send + Sync {
    /// Creates a new item
    async fn create_item(&self, new_item: CreateTodoItem) -> Result<TodoItem, sqlx::Error>;

    /// Fetches an item by ID
    async fn item_by_id(&self, item_id: Uuid) -> Result<Option<TodoItem>, sqlx::Error>;

    /// Applies a partial update to an item
    async fn update_item(
        &self,
        item_id: Uuid,
        update: UpdateTodoItem,
    ) -> Result<Option<TodoItem>, sqlx::Error>;

    /// Removes an item; false if it did not exist
    async fn remove_item(&self, item_id: Uuid) -> Result<bool, sqlx::Error>;

    /// Bulk-updates items belonging to one list
    ///
    /// Every element must already exist; rows are matched by ID and the
    /// mutable fields (name, notes, completed, due date) are overwritten.
    /// Returns the updated rows.
    async fn update_all_in_list(&self, items: &[TodoItem]) -> Result<Vec<TodoItem>, sqlx::Error>;

    /// All items in a list
    async fn all_for_list(&self, list_id: Uuid) -> Result<Vec<TodoItem>, sqlx::Error>;

    /// Items in a list that are not completed
    async fn active_for_list(&self, list_id: Uuid) -> Result<Vec<TodoItem>, sqlx::Error>;

    /// Items in a list that are completed
    async fn completed_for_list(&self, list_id: Uuid) -> Result<Vec<TodoItem>, sqlx::Error>;

    /// Flips an item's completion flag; false if the item did not exist
    async fn toggle_complete(&self, item_id: Uuid) -> Result<bool, sqlx::Error>;

    /// Flushes pending writes for implementations that batch
    async fn save(&self) -> Result<bool, sqlx::Error>;
}

/// PostgreSQL-backed item repository
#[derive(Clone)]
pub struct PgTodoItemRepo {
    pool: PgPool,
}

impl PgTodoItemRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn items_where_completed(
        &self,
        list_id: Uuid,
        completed: bool,
    ) -> Result<Vec<TodoItem>, sqlx::Error> {
        let items = sqlx::query_as::<_, TodoItem>(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM todo_items
            WHERE list_id = $1 AND completed = $2
            ORDER BY created_at
            "#,
        ))
        .bind(list_id)
        .bind(completed)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}

#[async_trait]
impl TodoItemRepo for PgTodoItemRepo {
    async fn create_item(&self, new_item: CreateTodoItem) -> Result<TodoItem, sqlx::Error> {
        let item = sqlx::query_as::<_, TodoItem>(&format!(
            r#"
            INSERT INTO todo_items (list_id, name, notes, due_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {ITEM_COLUMNS}
            "#,
        ))
        .bind(new_item.list_id)
        .bind(new_item.name)
        .bind(new_item.notes)
        .bind(new_item.due_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(item)
    }

    async fn item_by_id(&self, item_id: Uuid) -> Result<Option<TodoItem>, sqlx::Error> {
        let item = sqlx::query_as::<_, TodoItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM todo_items WHERE id = $1",
        ))
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    async fn update_item(
        &self,
        item_id: Uuid,
        update: UpdateTodoItem,
    ) -> Result<Option<TodoItem>, sqlx::Error> {
        if update.is_empty() {
            return self.item_by_id(item_id).await;
        }

        // Build the SET list dynamically from the fields that are present.
        let mut query = String::from("UPDATE todo_items SET updated_at = NOW()");
        let mut bind_count = 1;

        if update.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if update.notes.is_some() {
            bind_count += 1;
            query.push_str(&format!(", notes = ${}", bind_count));
        }
        if update.completed.is_some() {
            bind_count += 1;
            query.push_str(&format!(", completed = ${}", bind_count));
        }
        if update.due_at.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_at = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {ITEM_COLUMNS}"));

        let mut q = sqlx::query_as::<_, TodoItem>(&query).bind(item_id);

        if let Some(name) = update.name {
            q = q.bind(name);
        }
        if let Some(notes) = update.notes {
            q = q.bind(notes);
        }
        if let Some(completed) = update.completed {
            q = q.bind(completed);
        }
        if let Some(due_at) = update.due_at {
            q = q.bind(due_at);
        }

        let item = q.fetch_optional(&self.pool).await?;

        Ok(item)
    }

    async fn remove_item(&self, item_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todo_items WHERE id = $1")
            .bind(item_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_all_in_list(&self, items: &[TodoItem]) -> Result<Vec<TodoItem>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let mut updated = Vec::with_capacity(items.len());

        for item in items {
            let row = sqlx::query_as::<_, TodoItem>(&format!(
                r#"
                UPDATE todo_items
                SET name = $3, notes = $4, completed = $5, due_at = $6, updated_at = NOW()
                WHERE id = $1 AND list_id = $2
                RETURNING {ITEM_COLUMNS}
                "#,
            ))
            .bind(item.id)
            .bind(item.list_id)
            .bind(&item.name)
            .bind(&item.notes)
            .bind(item.completed)
            .bind(item.due_at)
            .fetch_optional(&mut *tx)
            .await?;

            if let Some(row) = row {
                updated.push(row);
            }
        }

        tx.commit().await?;
        Ok(updated)
    }

    async fn all_for_list(&self, list_id: Uuid) -> Result<Vec<TodoItem>, sqlx::Error> {
        let items = sqlx::query_as::<_, TodoItem>(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM todo_items
            WHERE list_id = $1
            ORDER BY created_at
            "#,
        ))
        .bind(list_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn active_for_list(&self, list_id: Uuid) -> Result<Vec<TodoItem>, sqlx::Error> {
        self.items_where_completed(list_id, false).await
    }

    async fn completed_for_list(&self, list_id: Uuid) -> Result<Vec<TodoItem>, sqlx::Error> {
        self.items_where_completed(list_id, true).await
    }

    async fn toggle_complete(&self, item_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE todo_items SET completed = NOT completed, updated_at = NOW() WHERE id = $1",
        )
        .bind(item_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn save(&self) -> Result<bool, sqlx::Error> {
        // Every operation above writes through; nothing to flush.
        Ok(true)
    }
}
