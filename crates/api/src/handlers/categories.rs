//! Category reference-data handlers
//!
//! List, create, delete only: reference data has no detail view and no
//! update. Reads are open; writes are admin-only.

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
    db::models::Category,
    errors::Result,
};

#[derive(Debug, Deserialize)]
pub struct CategoryListQuery {
    /// Name substring search
    pub search: Option<String>,

    pub page: Option<u64>,

    pub page_size: Option<u64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 256))]
    pub name: String,

    #[validate(length(min = 1, max = 50))]
    pub slug: String,
}

/// List categories, optionally filtered by name
pub async fn list_categories(
    State(state): State<AppState>,
    MaybeAuthUser(_caller): MaybeAuthUser,
    Query(query): Query<CategoryListQuery>,
) -> Result<Json<Paginated<Category>>> {
    let (page, page_size) = resolve_page(query.page, query.page_size);
    let (categories, count) = state
        .repo
        .list_categories(query.search.as_deref(), page, page_size)
        .await?;

    Ok(Json(Paginated {
        count,
        results: categories,
    }))
}

/// Create a category
pub async fn create_category(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>)> {
    permissions::require_class(Some(&caller), Scope::Catalog, Action::Create)?;

    request.validate()?;
    validate_slug(&request.slug)?;

    let category = state.repo.create_category(request.name, request.slug).await?;

    tracing::info!(slug = %category.slug, "Category created");

    Ok((StatusCode::CREATED, Json(category)))
}

/// Delete a category by slug; titles keep existing with a null category
pub async fn delete_category(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(slug): Path<String>,
) -> Result<StatusCode> {
    permissions::require_class(Some(&caller), Scope::Catalog, Action::Delete)?;

    state.repo.delete_category(&slug).await?;

    tracing::info!(slug = %slug, "Category deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_category_request_validation() {
        let ok = CreateCategoryRequest {
            name: "Books".to_string(),
            slug: "books".to_string(),
        };
        assert!(ok.validate().is_ok());

        let empty_name = CreateCategoryRequest {
            name: String::new(),
            slug: "books".to_string(),
        };
        assert!(empty_name.validate().is_err());
    }
}
