//! User management handlers
//!
//! The /users collection is an admin surface; /users/me is every
//! authenticated caller's own profile. A self-edit can never change
//! the caller's role: the server pins the stored role regardless of
//! what the request body carries.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::handlers::{resolve_page, Paginated};
use crate::AppState;
use critiq_common::{
    auth::{
        permissions::{self, Action, Scope},
        validate_username, AuthUser,
    },
    db::{models::Role, models::User, UserChanges},
    errors::{ApiError, Result},
};

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    /// Exact-username search
    pub search: Option<String>,

    pub page: Option<u64>,

    pub page_size: Option<u64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 150))]
    pub username: String,

    #[validate(email, length(max = 254))]
    pub email: String,

    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,

    #[serde(default)]
    pub bio: String,

    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email, length(max = 254))]
    pub email: Option<String>,

    #[validate(length(max = 150))]
    pub first_name: Option<String>,

    #[validate(length(max = 150))]
    pub last_name: Option<String>,

    pub bio: Option<String>,

    pub role: Option<Role>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let role = user.role();
        Self {
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            role,
        }
    }
}

/// List users, optionally filtered by exact username
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Paginated<UserResponse>>> {
    permissions::require_class(Some(&caller), Scope::Users, Action::List)?;

    let (page, page_size) = resolve_page(query.page, query.page_size);
    let (users, count) = state
        .repo
        .list_users(query.search.as_deref(), page, page_size)
        .await?;

    Ok(Json(Paginated {
        count,
        results: users.into_iter().map(Into::into).collect(),
    }))
}

/// Create a user (admin surface; may set any role)
pub async fn create_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    permissions::require_class(Some(&caller), Scope::Users, Action::Create)?;

    request.validate()?;
    validate_username(&request.username)?;

    let user = state
        .repo
        .create_user(
            request.username,
            request.email,
            request.first_name,
            request.last_name,
            request.bio,
            request.role,
        )
        .await?;

    tracing::info!(username = %user.username, "User created");

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Get a user by username
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>> {
    permissions::require_class(Some(&caller), Scope::Users, Action::Retrieve)?;

    let user = state.repo.get_user_by_username(&username).await?;
    Ok(Json(user.into()))
}

/// Update a user by username (admin surface; may change the role)
pub async fn patch_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(username): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>> {
    permissions::require_class(Some(&caller), Scope::Users, Action::Update)?;

    request.validate()?;

    let user = state.repo.get_user_by_username(&username).await?;
    let user = state
        .repo
        .update_user(
            user,
            UserChanges {
                email: request.email,
                first_name: request.first_name,
                last_name: request.last_name,
                bio: request.bio,
                role: request.role,
            },
        )
        .await?;

    Ok(Json(user.into()))
}

/// Delete a user by username
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(username): Path<String>,
) -> Result<StatusCode> {
    permissions::require_class(Some(&caller), Scope::Users, Action::Delete)?;

    state.repo.delete_user(&username).await?;

    tracing::info!(username = %username, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Get the caller's own profile
pub async fn me(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<UserResponse>> {
    permissions::require_class(Some(&caller), Scope::OwnProfile, Action::Retrieve)?;

    let user = state
        .repo
        .find_user_by_id(caller.id)
        .await?
        .ok_or_else(|| ApiError::UserNotFound {
            username: caller.username.clone(),
        })?;

    Ok(Json(user.into()))
}

/// Update the caller's own profile. The role field is never
/// caller-writable here: whatever the body carries, the stored role is
/// forced back onto the row.
pub async fn patch_me(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>> {
    permissions::require_class(Some(&caller), Scope::OwnProfile, Action::Update)?;

    request.validate()?;

    let user = state
        .repo
        .find_user_by_id(caller.id)
        .await?
        .ok_or_else(|| ApiError::UserNotFound {
            username: caller.username.clone(),
        })?;

    let stored_role = user.role();
    let user = state
        .repo
        .update_user(
            user,
            UserChanges {
                email: request.email,
                first_name: request.first_name,
                last_name: request.last_name,
                bio: request.bio,
                // Self-edit keeps the stored role even if the body
                // carried a different one
                role: Some(stored_role),
            },
        )
        .await?;

    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_request_defaults_role_to_user() {
        let request: CreateUserRequest = serde_json::from_value(serde_json::json!({
            "username": "reader",
            "email": "reader@example.com"
        }))
        .unwrap();

        assert_eq!(request.role, Role::User);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_update_request_accepts_partial_body() {
        let request: UpdateUserRequest = serde_json::from_value(serde_json::json!({
            "bio": "Reads a lot"
        }))
        .unwrap();

        assert!(request.email.is_none());
        assert!(request.role.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_update_request_rejects_bad_email() {
        let request: UpdateUserRequest = serde_json::from_value(serde_json::json!({
            "email": "not-an-email"
        }))
        .unwrap();

        assert!(request.validate().is_err());
    }
}
