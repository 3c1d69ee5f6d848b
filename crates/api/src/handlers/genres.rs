//! Genre reference-data handlers
//!
//! Same surface as categories: list, create, delete, with open reads
//! and admin-only writes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::handlers::{resolve_page, validate_slug, Paginated};
use crate::AppState;
use critiq_common::{
    auth::{
        permissions::{self, Action, Scope},
        AuthUser, MaybeAuthUser,
    },
    db::models::Genre,
    errors::Result,
};

#[derive(Debug, Deserialize)]
pub struct GenreListQuery {
    /// Name substring search
    pub search: Option<String>,

    pub page: Option<u64>,

    pub page_size: Option<u64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGenreRequest {
    #[validate(length(min = 1, max = 256))]
    pub name: String,

    #[validate(length(min = 1, max = 50))]
    pub slug: String,
}

/// List genres, optionally filtered by name
pub async fn list_genres(
    State(state): State<AppState>,
    MaybeAuthUser(_caller): MaybeAuthUser,
    Query(query): Query<GenreListQuery>,
) -> Result<Json<Paginated<Genre>>> {
    let (page, page_size) = resolve_page(query.page, query.page_size);
    let (genres, count) = state
        .repo
        .list_genres(query.search.as_deref(), page, page_size)
        .await?;

    Ok(Json(Paginated {
        count,
        results: genres,
    }))
}

/// Create a genre
pub async fn create_genre(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(request): Json<CreateGenreRequest>,
) -> Result<(StatusCode, Json<Genre>)> {
    permissions::require_class(Some(&caller), Scope::Catalog, Action::Create)?;

    request.validate()?;
    validate_slug(&request.slug)?;

    let genre = state.repo.create_genre(request.name, request.slug).await?;

    tracing::info!(slug = %genre.slug, "Genre created");

    Ok((StatusCode::CREATED, Json(genre)))
}

/// Delete a genre by slug
pub async fn delete_genre(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(slug): Path<String>,
) -> Result<StatusCode> {
    permissions::require_class(Some(&caller), Scope::Catalog, Action::Delete)?;

    state.repo.delete_genre(&slug).await?;

    tracing::info!(slug = %slug, "Genre deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_genre_request_validation() {
        let ok = CreateGenreRequest {
            name: "True crime".to_string(),
            slug: "true-crime".to_string(),
        };
        assert!(ok.validate().is_ok());

        let overlong_slug = CreateGenreRequest {
            name: "True crime".to_string(),
            slug: "x".repeat(51),
        };
        assert!(overlong_slug.validate().is_err());
    }
}
