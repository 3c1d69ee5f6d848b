//! Title catalog handlers
//!
//! Reads are open to anyone, including anonymous callers; writes are
//! admin-only. Every read carries the computed rating.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::handlers::{resolve_page, validate_year, Paginated};
use crate::AppState;
use critiq_common::{
    auth::{
        permissions::{self, Action, Scope},
        AuthUser, MaybeAuthUser,
    },
    db::{
        models::{Category, Genre},
        TitleChanges, TitleFilter, TitleWithMeta,
    },
    errors::{ApiError, Result},
};

#[derive(Debug, Deserialize)]
pub struct TitleListQuery {
    /// Exact category slug
    pub category: Option<String>,

    /// Exact genre slug
    pub genre: Option<String>,

    /// Substring of the title name
    pub name: Option<String>,

    /// Exact release year
    pub year: Option<i16>,

    pub page: Option<u64>,

    pub page_size: Option<u64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTitleRequest {
    #[validate(length(min = 1, max = 256))]
    pub name: String,

    pub year: i16,

    pub description: Option<String>,

    /// Genre slugs; a title is created with at least one genre
    #[validate(length(min = 1))]
    pub genre: Vec<String>,

    pub category: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTitleRequest {
    #[validate(length(min = 1, max = 256))]
    pub name: Option<String>,

    pub year: Option<i16>,

    pub description: Option<String>,

    pub genre: Option<Vec<String>>,

    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TitleResponse {
    pub id: Uuid,
    pub name: String,
    pub year: i16,
    pub description: Option<String>,
    pub genre: Vec<Genre>,
    pub category: Option<Category>,
    /// Mean review score; absent while the title has no reviews
    pub rating: Option<f64>,
}

impl From<TitleWithMeta> for TitleResponse {
    fn from(meta: TitleWithMeta) -> Self {
        Self {
            id: meta.title.id,
            name: meta.title.name,
            year: meta.title.year,
            description: meta.title.description,
            genre: meta.genres,
            category: meta.category,
            rating: meta.rating,
        }
    }
}

/// List titles with filtering by category, genre, name, and year
pub async fn list_titles(
    State(state): State<AppState>,
    MaybeAuthUser(_caller): MaybeAuthUser,
    Query(query): Query<TitleListQuery>,
) -> Result<Json<Paginated<TitleResponse>>> {
    let filter = TitleFilter {
        category: query.category,
        genre: query.genre,
        name: query.name,
        year: query.year,
    };

    let (page, page_size) = resolve_page(query.page, query.page_size);
    let title_page = state.repo.list_titles(&filter, page, page_size).await?;

    Ok(Json(Paginated {
        count: title_page.total,
        results: title_page.items.into_iter().map(Into::into).collect(),
    }))
}

/// Create a title with its category and genre set
pub async fn create_title(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(request): Json<CreateTitleRequest>,
) -> Result<(StatusCode, Json<TitleResponse>)> {
    permissions::require_class(Some(&caller), Scope::Catalog, Action::Create)?;

    request.validate()?;
    validate_year(request.year)?;

    let title = state
        .repo
        .create_title(
            request.name,
            request.year,
            request.description,
            &request.category,
            &request.genre,
        )
        .await?;

    tracing::info!(title_id = %title.title.id, "Title created");

    Ok((StatusCode::CREATED, Json(title.into())))
}

/// Get a title by ID, with its computed rating
pub async fn get_title(
    State(state): State<AppState>,
    MaybeAuthUser(_caller): MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TitleResponse>> {
    let title = state.repo.get_title(id).await?;
    Ok(Json(title.into()))
}

/// Update a title; a genre list in the body replaces the whole set
pub async fn patch_title(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTitleRequest>,
) -> Result<Json<TitleResponse>> {
    permissions::require_class(Some(&caller), Scope::Catalog, Action::Update)?;

    request.validate()?;
    if let Some(year) = request.year {
        validate_year(year)?;
    }
    if let Some(ref genres) = request.genre {
        if genres.is_empty() {
            return Err(ApiError::Validation {
                message: "genre list may not be empty".to_string(),
                field: Some("genre".to_string()),
            });
        }
    }

    let title = state
        .repo
        .update_title(
            id,
            TitleChanges {
                name: request.name,
                year: request.year,
                description: request.description,
                category: request.category,
                genres: request.genre,
            },
        )
        .await?;

    Ok(Json(title.into()))
}

/// Delete a title; its reviews and their comments go with it
pub async fn delete_title(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    permissions::require_class(Some(&caller), Scope::Catalog, Action::Delete)?;

    state.repo.delete_title(id).await?;

    tracing::info!(title_id = %id, "Title deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_title_requires_genres() {
        let request: CreateTitleRequest = serde_json::from_value(serde_json::json!({
            "name": "In Cold Blood",
            "year": 1966,
            "genre": [],
            "category": "books"
        }))
        .unwrap();

        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_title_accepts_valid_body() {
        let request: CreateTitleRequest = serde_json::from_value(serde_json::json!({
            "name": "In Cold Blood",
            "year": 1966,
            "description": "A non-fiction novel",
            "genre": ["true-crime"],
            "category": "books"
        }))
        .unwrap();

        assert!(request.validate().is_ok());
        assert!(validate_year(request.year).is_ok());
    }

    #[test]
    fn test_update_title_allows_partial_body() {
        let request: UpdateTitleRequest = serde_json::from_value(serde_json::json!({
            "description": "Updated description"
        }))
        .unwrap();

        assert!(request.validate().is_ok());
        assert!(request.name.is_none());
        assert!(request.genre.is_none());
    }
}
