//! Comment handlers, nested under a title's reviews
//!
//! Same policy as reviews: open reads, authenticated creation, and
//! modification gated on author/moderator/admin/staff.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::handlers::{PageParams, Paginated};
use crate::AppState;
use critiq_common::{
    auth::{
        permissions::{self, Action, Scope},
        AuthUser, MaybeAuthUser,
    },
    db::models::{Comment, User},
    errors::Result,
    metrics,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1))]
    pub text: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1))]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    /// Author's username
    pub author: String,
    pub text: String,
    pub created_at: DateTime<FixedOffset>,
}

impl From<(Comment, User)> for CommentResponse {
    fn from((comment, author): (Comment, User)) -> Self {
        Self {
            id: comment.id,
            author: author.username,
            text: comment.text,
            created_at: comment.created_at,
        }
    }
}

/// List comments on a review, newest first
pub async fn list_comments(
    State(state): State<AppState>,
    MaybeAuthUser(_caller): MaybeAuthUser,
    Path((title_id, review_id)): Path<(Uuid, Uuid)>,
    Query(page_params): Query<PageParams>,
) -> Result<Json<Paginated<CommentResponse>>> {
    // Resolving the review also checks it belongs to this title
    let review = state.repo.get_review(title_id, review_id).await?;

    let (page, page_size) = page_params.resolve();
    let (rows, count) = state.repo.list_comments(review.id, page, page_size).await?;

    Ok(Json(Paginated {
        count,
        results: rows.into_iter().map(Into::into).collect(),
    }))
}

/// Create a comment on a review
pub async fn create_comment(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path((title_id, review_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>)> {
    permissions::require_class(Some(&caller), Scope::Comments, Action::Create)?;

    request.validate()?;
    let review = state.repo.get_review(title_id, review_id).await?;

    let comment = state
        .repo
        .create_comment(review.id, caller.id, request.text)
        .await?;

    metrics::record_comment_created();

    tracing::info!(comment_id = %comment.id, review_id = %review_id, "Comment created");

    let response = CommentResponse {
        id: comment.id,
        author: caller.username,
        text: comment.text,
        created_at: comment.created_at,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Get a single comment
pub async fn get_comment(
    State(state): State<AppState>,
    MaybeAuthUser(_caller): MaybeAuthUser,
    Path((title_id, review_id, comment_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<Json<CommentResponse>> {
    state.repo.get_review(title_id, review_id).await?;
    let row = state
        .repo
        .get_comment_with_author(review_id, comment_id)
        .await?;

    Ok(Json(row.into()))
}

/// Update a comment's text
pub async fn patch_comment(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path((title_id, review_id, comment_id)): Path<(Uuid, Uuid, Uuid)>,
    Json(request): Json<UpdateCommentRequest>,
) -> Result<Json<CommentResponse>> {
    permissions::require_class(Some(&caller), Scope::Comments, Action::Update)?;

    request.validate()?;

    state.repo.get_review(title_id, review_id).await?;
    let (comment, author) = state
        .repo
        .get_comment_with_author(review_id, comment_id)
        .await?;
    permissions::require_object(&caller, Action::Update, comment.author_id)?;

    let comment = state.repo.update_comment(comment, request.text).await?;

    Ok(Json((comment, author).into()))
}

/// Delete a comment
pub async fn delete_comment(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path((title_id, review_id, comment_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<StatusCode> {
    permissions::require_class(Some(&caller), Scope::Comments, Action::Delete)?;

    state.repo.get_review(title_id, review_id).await?;
    let comment = state.repo.get_comment(review_id, comment_id).await?;
    permissions::require_object(&caller, Action::Delete, comment.author_id)?;

    state.repo.delete_comment(comment.id).await?;

    tracing::info!(comment_id = %comment_id, "Comment deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_comment_is_rejected() {
        let request = CreateCommentRequest {
            text: String::new(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_with_no_fields_is_valid() {
        let request: UpdateCommentRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(request.validate().is_ok());
        assert!(request.text.is_none());
    }
}
