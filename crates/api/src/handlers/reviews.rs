//! Review handlers, nested under titles
//!
//! Reads are open; creation requires authentication; modification
//! passes two gates: the class gate before the row is loaded, and the
//! object gate (author, moderator, admin, or staff) after.

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
    db::models::{Review, User},
    errors::Result,
    metrics,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[validate(length(min = 1))]
    pub text: String,

    #[validate(range(min = 0, max = 10))]
    pub score: i16,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateReviewRequest {
    #[validate(length(min = 1))]
    pub text: Option<String>,

    #[validate(range(min = 0, max = 10))]
    pub score: Option<i16>,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: Uuid,
    /// Author's username
    pub author: String,
    pub text: String,
    pub score: i16,
    pub created_at: DateTime<FixedOffset>,
}

impl From<(Review, User)> for ReviewResponse {
    fn from((review, author): (Review, User)) -> Self {
        Self {
            id: review.id,
            author: author.username,
            text: review.text,
            score: review.score,
            created_at: review.created_at,
        }
    }
}

/// List reviews for a title, newest first
pub async fn list_reviews(
    State(state): State<AppState>,
    MaybeAuthUser(_caller): MaybeAuthUser,
    Path(title_id): Path<Uuid>,
    Query(page_params): Query<PageParams>,
) -> Result<Json<Paginated<ReviewResponse>>> {
    state.repo.title_exists(title_id).await?;

    let (page, page_size) = page_params.resolve();
    let (rows, count) = state.repo.list_reviews(title_id, page, page_size).await?;

    Ok(Json(Paginated {
        count,
        results: rows.into_iter().map(Into::into).collect(),
    }))
}

/// Create a review. The store's uniqueness constraint rejects a second
/// review from the same author for the same title, even under
/// concurrent requests.
pub async fn create_review(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(title_id): Path<Uuid>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>)> {
    permissions::require_class(Some(&caller), Scope::Reviews, Action::Create)?;

    request.validate()?;
    state.repo.title_exists(title_id).await?;

    let review = state
        .repo
        .create_review(title_id, caller.id, request.text, request.score)
        .await?;

    metrics::record_review_created();

    tracing::info!(review_id = %review.id, title_id = %title_id, "Review created");

    let response = ReviewResponse {
        id: review.id,
        author: caller.username,
        text: review.text,
        score: review.score,
        created_at: review.created_at,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Get a single review
pub async fn get_review(
    State(state): State<AppState>,
    MaybeAuthUser(_caller): MaybeAuthUser,
    Path((title_id, review_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ReviewResponse>> {
    let row = state.repo.get_review_with_author(title_id, review_id).await?;
    Ok(Json(row.into()))
}

/// Update a review's text and/or score
pub async fn patch_review(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path((title_id, review_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateReviewRequest>,
) -> Result<Json<ReviewResponse>> {
    permissions::require_class(Some(&caller), Scope::Reviews, Action::Update)?;

    request.validate()?;

    let (review, author) = state.repo.get_review_with_author(title_id, review_id).await?;
    permissions::require_object(&caller, Action::Update, review.author_id)?;

    let review = state
        .repo
        .update_review(review, request.text, request.score)
        .await?;

    Ok(Json((review, author).into()))
}

/// Delete a review; its comments cascade
pub async fn delete_review(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path((title_id, review_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    permissions::require_class(Some(&caller), Scope::Reviews, Action::Delete)?;

    let review = state.repo.get_review(title_id, review_id).await?;
    permissions::require_object(&caller, Action::Delete, review.author_id)?;

    state.repo.delete_review(review.id).await?;

    tracing::info!(review_id = %review_id, "Review deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use critiq_common::{MAX_SCORE, MIN_SCORE};

    #[test]
    fn test_score_bounds() {
        for score in [MIN_SCORE, 5, MAX_SCORE] {
            let request = CreateReviewRequest {
                text: "A fine debut".to_string(),
                score,
            };
            assert!(request.validate().is_ok(), "score {score} should be valid");
        }

        for score in [-1, 11, 100] {
            let request = CreateReviewRequest {
                text: "A fine debut".to_string(),
                score,
            };
            assert!(request.validate().is_err(), "score {score} should be rejected");
        }
    }

    #[test]
    fn test_empty_text_is_rejected() {
        let request = CreateReviewRequest {
            text: String::new(),
            score: 5,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_allows_score_only() {
        let request: UpdateReviewRequest = serde_json::from_value(serde_json::json!({
            "score": 9
        }))
        .unwrap();

        assert!(request.validate().is_ok());
        assert!(request.text.is_none());
    }
}
