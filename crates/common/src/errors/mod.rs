//! Error types for the Critiq services
//!
//! Provides a comprehensive error handling system with:
//! - Distinct error types for different failure modes
//! - HTTP status code mapping
//! - Structured error responses
//! - Error codes for client handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    InvalidUsername,
    EmailMismatch,
    InvalidConfirmationCode,
    AlreadyExists,

    // Authentication errors (2xxx)
    Unauthorized,
    InvalidToken,
    ExpiredToken,

    // Authorization errors (3xxx)
    Forbidden,

    // Resource errors (4xxx)
    NotFound,
    UserNotFound,
    CategoryNotFound,
    GenreNotFound,
    TitleNotFound,
    ReviewNotFound,
    CommentNotFound,

    // Conflict errors (5xxx)
    ReviewExists,

    // Rate limiting (6xxx)
    RateLimited,

    // Database errors (7xxx)
    DatabaseError,
    ConnectionError,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            // Validation (1xxx)
            ErrorCode::ValidationError => 1001,
            ErrorCode::InvalidUsername => 1002,
            ErrorCode::EmailMismatch => 1003,
            ErrorCode::InvalidConfirmationCode => 1004,
            ErrorCode::AlreadyExists => 1005,

            // Auth (2xxx)
            ErrorCode::Unauthorized => 2001,
            ErrorCode::InvalidToken => 2002,
            ErrorCode::ExpiredToken => 2003,

            // Authz (3xxx)
            ErrorCode::Forbidden => 3001,

            // Resources (4xxx)
            ErrorCode::NotFound => 4001,
            ErrorCode::UserNotFound => 4002,
            ErrorCode::CategoryNotFound => 4003,
            ErrorCode::GenreNotFound => 4004,
            ErrorCode::TitleNotFound => 4005,
            ErrorCode::ReviewNotFound => 4006,
            ErrorCode::CommentNotFound => 4007,

            // Conflicts (5xxx)
            ErrorCode::ReviewExists => 5001,

            // Rate limits (6xxx)
            ErrorCode::RateLimited => 6001,

            // Database (7xxx)
            ErrorCode::DatabaseError => 7001,
            ErrorCode::ConnectionError => 7002,

            // Internal (9xxx)
            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum ApiError {
    // Validation errors
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Invalid username: {username}")]
    InvalidUsername { username: String },

    #[error("Email does not match the one on record for this username")]
    EmailMismatch,

    #[error("Invalid confirmation code")]
    InvalidConfirmationCode,

    #[error("Already in use: {message}")]
    AlreadyExists { message: String },

    // Authentication errors
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    ExpiredToken,

    // Authorization errors
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    // Resource errors
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound { resource_type: String, id: String },

    #[error("User not found: {username}")]
    UserNotFound { username: String },

    #[error("Category not found: {slug}")]
    CategoryNotFound { slug: String },

    #[error("Genre not found: {slug}")]
    GenreNotFound { slug: String },

    #[error("Title not found: {id}")]
    TitleNotFound { id: String },

    #[error("Review not found: {id}")]
    ReviewNotFound { id: String },

    #[error("Comment not found: {id}")]
    CommentNotFound { id: String },

    // Conflict errors
    #[error("A review for this title by this author already exists")]
    ReviewExists,

    // Rate limiting
    #[error("Rate limit exceeded")]
    RateLimited,

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Database connection error: {message}")]
    DatabaseConnection { message: String },

    // Internal errors
    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::Validation { .. } => ErrorCode::ValidationError,
            ApiError::InvalidUsername { .. } => ErrorCode::InvalidUsername,
            ApiError::EmailMismatch => ErrorCode::EmailMismatch,
            ApiError::InvalidConfirmationCode => ErrorCode::InvalidConfirmationCode,
            ApiError::AlreadyExists { .. } => ErrorCode::AlreadyExists,
            ApiError::Unauthorized { .. } => ErrorCode::Unauthorized,
            ApiError::InvalidToken => ErrorCode::InvalidToken,
            ApiError::ExpiredToken => ErrorCode::ExpiredToken,
            ApiError::Forbidden { .. } => ErrorCode::Forbidden,
            ApiError::NotFound { .. } => ErrorCode::NotFound,
            ApiError::UserNotFound { .. } => ErrorCode::UserNotFound,
            ApiError::CategoryNotFound { .. } => ErrorCode::CategoryNotFound,
            ApiError::GenreNotFound { .. } => ErrorCode::GenreNotFound,
            ApiError::TitleNotFound { .. } => ErrorCode::TitleNotFound,
            ApiError::ReviewNotFound { .. } => ErrorCode::ReviewNotFound,
            ApiError::CommentNotFound { .. } => ErrorCode::CommentNotFound,
            ApiError::ReviewExists => ErrorCode::ReviewExists,
            ApiError::RateLimited => ErrorCode::RateLimited,
            ApiError::Database(_) => ErrorCode::DatabaseError,
            ApiError::DatabaseConnection { .. } => ErrorCode::ConnectionError,
            ApiError::Internal { .. } => ErrorCode::InternalError,
            ApiError::Configuration { .. } => ErrorCode::ConfigurationError,
            ApiError::Serialization(_) => ErrorCode::SerializationError,
            ApiError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            ApiError::Validation { .. }
            | ApiError::InvalidUsername { .. }
            | ApiError::EmailMismatch
            | ApiError::InvalidConfirmationCode
            | ApiError::AlreadyExists { .. } => StatusCode::BAD_REQUEST,

            // 401 Unauthorized
            ApiError::Unauthorized { .. } | ApiError::InvalidToken | ApiError::ExpiredToken => {
                StatusCode::UNAUTHORIZED
            }

            // 403 Forbidden
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,

            // 404 Not Found
            ApiError::NotFound { .. }
            | ApiError::UserNotFound { .. }
            | ApiError::CategoryNotFound { .. }
            | ApiError::GenreNotFound { .. }
            | ApiError::TitleNotFound { .. }
            | ApiError::ReviewNotFound { .. }
            | ApiError::CommentNotFound { .. } => StatusCode::NOT_FOUND,

            // 409 Conflict
            ApiError::ReviewExists => StatusCode::CONFLICT,

            // 429 Too Many Requests
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,

            // 500 Internal Server Error
            ApiError::Database(_)
            | ApiError::DatabaseConnection { .. }
            | ApiError::Internal { .. }
            | ApiError::Configuration { .. }
            | ApiError::Serialization(_)
            | ApiError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Structured error response for API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        // Log based on severity
        if self.is_server_error() {
            tracing::error!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let field = match &self {
            ApiError::Validation { field, .. } => field.clone(),
            _ => None,
        };

        let body = ErrorResponse {
            error: ErrorDetails {
                code,
                message,
                field,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation {
            message: err.to_string(),
            field: err.field_errors().keys().next().map(|k| k.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let err = ApiError::UserNotFound {
            username: "capote".into(),
        };
        assert_eq!(err.code(), ErrorCode::UserNotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_error() {
        let err = ApiError::Validation {
            message: "Invalid year".into(),
            field: Some("year".into()),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(!err.is_server_error());
        assert!(err.is_client_error());
    }

    #[test]
    fn test_duplicate_review_is_conflict() {
        let err = ApiError::ReviewExists;
        assert_eq!(err.code(), ErrorCode::ReviewExists);
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_email_mismatch_is_bad_request() {
        assert_eq!(ApiError::EmailMismatch.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_auth_errors_are_unauthorized() {
        assert_eq!(ApiError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::ExpiredToken.status_code(), StatusCode::UNAUTHORIZED);
        let missing = ApiError::Unauthorized {
            message: "Missing Authorization header".into(),
        };
        assert_eq!(missing.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_server_error() {
        let err = ApiError::Internal {
            message: "Something went wrong".into(),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.is_server_error());
    }
}
