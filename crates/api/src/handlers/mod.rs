//! Request handlers

pub mod auth;
pub mod categories;
pub mod comments;
pub mod genres;
pub mod health;
pub mod reviews;
pub mod titles;
pub mod users;

use critiq_common::errors::{ApiError, Result};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Default page size for list endpoints
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Upper bound a client may request
pub const MAX_PAGE_SIZE: u64 = 100;

/// Maximum slug length for reference data
pub const SLUG_MAX_LEN: usize = 50;

/// Offset pagination query parameters shared by list endpoints.
/// Composite query structs carry the same two fields inline (flattening
/// breaks numeric parsing under serde_urlencoded) and resolve through
/// the same helper.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    /// 1-based page number
    pub page: Option<u64>,

    pub page_size: Option<u64>,
}

impl PageParams {
    /// Resolve to a 0-based page index and a clamped page size
    pub fn resolve(&self) -> (u64, u64) {
        resolve_page(self.page, self.page_size)
    }
}

/// Resolve raw pagination parameters to a 0-based page index and a
/// clamped page size
pub fn resolve_page(page: Option<u64>, page_size: Option<u64>) -> (u64, u64) {
    let page = page.unwrap_or(1).max(1) - 1;
    let page_size = page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    (page, page_size)
}

/// Envelope for paginated list responses
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub count: u64,
    pub results: Vec<T>,
}

static SLUG_RE: OnceLock<Regex> = OnceLock::new();

fn slug_re() -> &'static Regex {
    SLUG_RE.get_or_init(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid slug pattern"))
}

/// Validate a URL-safe slug
pub fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() || slug.len() > SLUG_MAX_LEN || !slug_re().is_match(slug) {
        return Err(ApiError::Validation {
            message: format!("invalid slug: {}", slug),
            field: Some("slug".to_string()),
        });
    }

    Ok(())
}

/// Validate a release year: may not be in the future
pub fn validate_year(year: i16) -> Result<()> {
    use chrono::Datelike;

    let current = chrono::Utc::now().year() as i16;
    if year > current {
        return Err(ApiError::Validation {
            message: format!("year {} is in the future", year),
            field: Some("year".to_string()),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_params_defaults() {
        let params = PageParams::default();
        assert_eq!(params.resolve(), (0, DEFAULT_PAGE_SIZE));
    }

    #[test]
    fn test_page_params_are_one_based() {
        let params = PageParams {
            page: Some(3),
            page_size: Some(25),
        };
        assert_eq!(params.resolve(), (2, 25));
    }

    #[test]
    fn test_page_size_is_clamped() {
        let params = PageParams {
            page: Some(0),
            page_size: Some(10_000),
        };
        assert_eq!(params.resolve(), (0, MAX_PAGE_SIZE));
    }

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("sci-fi").is_ok());
        assert!(validate_slug("films_2020").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("bad slug").is_err());
        assert!(validate_slug("émile").is_err());
        assert!(validate_slug(&"x".repeat(SLUG_MAX_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_year_rejects_future() {
        use chrono::Datelike;

        let current = chrono::Utc::now().year() as i16;
        assert!(validate_year(current).is_ok());
        assert!(validate_year(current - 30).is_ok());
        assert!(validate_year(current + 1).is_err());
    }
}
