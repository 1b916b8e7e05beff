/// To-do list endpoints
///
/// All routes require a bearer token. A caller sees a list when they own
/// it or it has been shared with them; anything else reads as 404 so list
/// existence is not revealed to non-members.
///
/// List creation is where the FREE/PRO tier gate bites: FREE accounts are
/// capped on owned lists, PRO is not.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tickstack_shared::{
    auth::middleware::AuthContext,
    models::{
        sharing::Sharing,
        todo_list::{CreateTodoList, TodoList},
        user::User,
    },
    quota::QuotaEnforcer,
};
use uuid::Uuid;
use validator::Validate;

/// List creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateListRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// Share / unshare request
#[derive(Debug, Deserialize, Validate)]
pub struct ShareRequest {
    /// Email of the user to grant or revoke
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Create a list
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `403 Forbidden`: FREE-tier list cap reached
pub async fn create_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateListRequest>,
) -> ApiResult<Json<TodoList>> {
    req.validate()?;

    QuotaEnforcer::new(state.db.clone())
        .enforce_list_create(auth.user_id)
        .await?;

    let list = TodoList::create(
        &state.db,
        CreateTodoList {
            owner_id: auth.user_id,
            name: req.name,
        },
    )
    .await?;

    Ok(Json(list))
}

/// Lists visible to the caller (owned + shared)
pub async fn list_lists(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TodoList>>> {
    let lists = TodoList::list_for_user(&state.db, auth.user_id).await?;
    Ok(Json(lists))
}

/// A single list the caller can access
pub async fn get_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(list_id): Path<Uuid>,
) -> ApiResult<Json<TodoList>> {
    let list = accessible_list(&state, list_id, auth.user_id).await?;
    Ok(Json(list))
}

/// Delete a list (owner only)
pub async fn delete_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(list_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = TodoList::delete_owned(&state.db, list_id, auth.user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("List not found.".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Share a list with another user by email (owner only)
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or sharing with yourself
/// - `404 Not Found`: List not owned by the caller, or target user unknown
pub async fn share_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(list_id): Path<Uuid>,
    Json(req): Json<ShareRequest>,
) -> ApiResult<StatusCode> {
    req.validate()?;

    let list = owned_list(&state, list_id, auth.user_id).await?;

    let target = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    if target.id == auth.user_id {
        return Err(ApiError::BadRequest(
            "Cannot share a list with yourself".to_string(),
        ));
    }

    Sharing::create(&state.db, list.id, target.id).await?;

    Ok(StatusCode::OK)
}

/// Revoke a user's access to a list (owner only)
pub async fn unshare_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(list_id): Path<Uuid>,
    Json(req): Json<ShareRequest>,
) -> ApiResult<StatusCode> {
    req.validate()?;

    let list = owned_list(&state, list_id, auth.user_id).await?;

    let target = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    let removed = Sharing::remove(&state.db, list.id, target.id).await?;
    if !removed {
        return Err(ApiError::NotFound("Sharing not found.".to_string()));
    }

    Ok(StatusCode::OK)
}

// -- Helpers ---------------------------------------------------------------

/// Fetches a list the caller can read/write; absent and inaccessible are
/// both 404.
pub(crate) async fn accessible_list(
    state: &AppState,
    list_id: Uuid,
    user_id: Uuid,
) -> Result<TodoList, ApiError> {
    if !TodoList::user_can_access(&state.db, list_id, user_id).await? {
        return Err(ApiError::NotFound("List not found.".to_string()));
    }

    TodoList::find_by_id(&state.db, list_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("List not found.".to_string()))
}

/// Fetches a list the caller owns; everything else is 404
async fn owned_list(
    state: &AppState,
    list_id: Uuid,
    user_id: Uuid,
) -> Result<TodoList, ApiError> {
    let list = TodoList::find_by_id(&state.db, list_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("List not found.".to_string()))?;

    if list.owner_id != user_id {
        return Err(ApiError::NotFound("List not found.".to_string()));
    }

    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_list_request_validation() {
        let ok = CreateListRequest {
            name: "Groceries".to_string(),
        };
        assert!(ok.validate().is_ok());

        let empty = CreateListRequest {
            name: String::new(),
        };
        assert!(empty.validate().is_err());

        let too_long = CreateListRequest {
            name: "x".repeat(256),
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_share_request_validation() {
        let ok = ShareRequest {
            email: "friend@example.com".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = ShareRequest {
            email: "not-an-email".to_string(),
        };
        assert!(bad.validate().is_err());
    }
}
