/// To-do item endpoints
///
/// All routes require a bearer token and go through the item repository.
/// Access is resolved at the list level: the owner and shared members may
/// read and write items; everyone else gets 404.
///
/// # Endpoints
///
/// - `POST /api/lists/:id/items` - Create an item
/// - `GET  /api/lists/:id/items?filter=all|active|completed` - List items
/// - `PUT  /api/lists/:id/items` - Bulk-update the list's items
/// - `GET  /api/items/:id` - Fetch one item
/// - `PUT  /api/items/:id` - Partial update
/// - `DELETE /api/items/:id` - Remove
/// - `POST /api/items/:id/toggle` - Flip the completion flag

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tickstack_shared::{
    auth::middleware::AuthContext,
    models::todo_item::{CreateTodoItem, TodoItem, UpdateTodoItem},
};
use uuid::Uuid;
use validator::Validate;

use super::lists::accessible_list;

/// Item creation request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    pub notes: Option<String>,

    pub due_at: Option<DateTime<Utc>>,
}

/// Item update request; omitted fields are left unchanged
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub name: Option<String>,

    /// `"notes": null` is "leave unchanged" in JSON; clearing goes
    /// through an explicit empty string
    pub notes: Option<String>,

    pub completed: Option<bool>,

    pub due_at: Option<DateTime<Utc>>,
}

/// One element of a bulk list update
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkItemUpdate {
    pub id: Uuid,
    pub name: String,
    pub notes: Option<String>,
    pub completed: bool,
    pub due_at: Option<DateTime<Utc>>,
}

/// Item list filter: all (default), active, or completed
#[derive(Debug, Deserialize, Default)]
pub struct ItemFilter {
    pub filter: Option<String>,
}

/// Create an item in a list
pub async fn create_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(list_id): Path<Uuid>,
    Json(req): Json<CreateItemRequest>,
) -> ApiResult<Json<TodoItem>> {
    req.validate()?;

    let list = accessible_list(&state, list_id, auth.user_id).await?;

    let item = state
        .items
        .create_item(CreateTodoItem {
            list_id: list.id,
            name: req.name,
            notes: req.notes,
            due_at: req.due_at,
        })
        .await?;

    Ok(Json(item))
}

/// Items in a list, optionally filtered to active or completed
pub async fn list_items(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(list_id): Path<Uuid>,
    Query(query): Query<ItemFilter>,
) -> ApiResult<Json<Vec<TodoItem>>> {
    let list = accessible_list(&state, list_id, auth.user_id).await?;

    let items = match query.filter.as_deref() {
        Some("active") => state.items.active_for_list(list.id).await?,
        Some("completed") => state.items.completed_for_list(list.id).await?,
        Some("all") | None => state.items.all_for_list(list.id).await?,
        Some(other) => {
            return Err(ApiError::BadRequest(format!(
                "Unknown filter '{}': expected all, active, or completed",
                other
            )))
        }
    };

    Ok(Json(items))
}

/// Bulk-update the items of one list
///
/// Every element must reference an item of this list; rows are matched by
/// ID and unknown IDs are skipped. Returns the updated items.
pub async fn update_list_items(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(list_id): Path<Uuid>,
    Json(req): Json<Vec<BulkItemUpdate>>,
) -> ApiResult<Json<Vec<TodoItem>>> {
    let list = accessible_list(&state, list_id, auth.user_id).await?;

    let now = Utc::now();
    let items: Vec<TodoItem> = req
        .into_iter()
        .map(|u| TodoItem {
            id: u.id,
            list_id: list.id,
            name: u.name,
            notes: u.notes,
            completed: u.completed,
            due_at: u.due_at,
            // Timestamps are rewritten by the store on update
            created_at: now,
            updated_at: now,
        })
        .collect();

    let updated = state.items.update_all_in_list(&items).await?;

    Ok(Json(updated))
}

/// Fetch one item
pub async fn get_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(item_id): Path<Uuid>,
) -> ApiResult<Json<TodoItem>> {
    let item = accessible_item(&state, item_id, auth.user_id).await?;
    Ok(Json(item))
}

/// Partially update one item
pub async fn update_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(item_id): Path<Uuid>,
    Json(req): Json<UpdateItemRequest>,
) -> ApiResult<Json<TodoItem>> {
    let item = accessible_item(&state, item_id, auth.user_id).await?;

    let update = UpdateTodoItem {
        name: req.name,
        notes: req.notes.map(|n| if n.is_empty() { None } else { Some(n) }),
        completed: req.completed,
        due_at: req.due_at.map(Some),
    };

    let updated = state
        .items
        .update_item(item.id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found.".to_string()))?;

    Ok(Json(updated))
}

/// Remove one item
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(item_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let item = accessible_item(&state, item_id, auth.user_id).await?;

    let removed = state.items.remove_item(item.id).await?;
    if !removed {
        return Err(ApiError::NotFound("Item not found.".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Flip an item's completion flag
pub async fn toggle_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(item_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let item = accessible_item(&state, item_id, auth.user_id).await?;

    let toggled = state.items.toggle_complete(item.id).await?;
    if !toggled {
        return Err(ApiError::NotFound("Item not found.".to_string()));
    }

    Ok(StatusCode::OK)
}

// -- Helpers ---------------------------------------------------------------

/// Fetches an item the caller can access via its parent list; absent and
/// inaccessible are both 404.
async fn accessible_item(
    state: &AppState,
    item_id: Uuid,
    user_id: Uuid,
) -> Result<TodoItem, ApiError> {
    let item = state
        .items
        .item_by_id(item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found.".to_string()))?;

    // Resolving the list also enforces membership
    accessible_list(state, item.list_id, user_id).await?;

    Ok(item)
}
