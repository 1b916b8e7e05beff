/// To-do item model
///
/// An item lives inside exactly one list. All persistence operations on
/// items go through the repository contract in [`crate::repo`]; this
/// module only defines the row and input shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An item within a to-do list
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    /// Unique item ID
    pub id: Uuid,

    /// Parent list
    pub list_id: Uuid,

    /// Display name
    pub name: String,

    /// Free-form notes
    pub notes: Option<String>,

    /// Completion flag
    pub completed: bool,

    /// Optional due date
    pub due_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new item
#[derive(Debug, Clone)]
pub struct CreateTodoItem {
    pub list_id: Uuid,
    pub name: String,
    pub notes: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
}

/// Input for updating an item
///
/// Only non-None fields are written; the double Option distinguishes
/// "leave unchanged" from "clear the value".
#[derive(Debug, Clone, Default)]
pub struct UpdateTodoItem {
    /// New display name
    pub name: Option<String>,

    /// New notes (Some(None) clears)
    pub notes: Option<Option<String>>,

    /// New completion flag
    pub completed: Option<bool>,

    /// New due date (Some(None) clears)
    pub due_at: Option<Option<DateTime<Utc>>>,
}

impl UpdateTodoItem {
    /// Whether this update writes anything at all
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.notes.is_none()
            && self.completed.is_none()
            && self.due_at.is_none()
    }
}
