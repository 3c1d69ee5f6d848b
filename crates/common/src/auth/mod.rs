//! Authentication utilities
//!
//! Provides:
//! - JWT token generation and validation
//! - Confirmation-code generation for the signup flow
//! - Username/input validation
//! - Axum extractors carrying the authenticated identity

pub mod permissions;

use crate::db::models::Role;
use crate::errors::{ApiError, Result};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use uuid::Uuid;

/// Maximum username length
pub const USERNAME_MAX_LEN: usize = 150;

/// Maximum email length
pub const EMAIL_MAX_LEN: usize = 254;

/// Username reserved for the profile endpoint
pub const RESERVED_USERNAME: &str = "me";

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();

fn username_re() -> &'static Regex {
    USERNAME_RE.get_or_init(|| Regex::new(r"^[\w.@+-]+$").expect("valid username pattern"))
}

/// Validate a username against the allowed pattern and reserved names
pub fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() || username.len() > USERNAME_MAX_LEN {
        return Err(ApiError::InvalidUsername {
            username: username.to_string(),
        });
    }

    if username.eq_ignore_ascii_case(RESERVED_USERNAME) {
        return Err(ApiError::InvalidUsername {
            username: username.to_string(),
        });
    }

    if !username_re().is_match(username) {
        return Err(ApiError::InvalidUsername {
            username: username.to_string(),
        });
    }

    Ok(())
}

/// Generate a fresh opaque confirmation code
pub fn generate_confirmation_code() -> String {
    let random_bytes: [u8; 16] = rand::random();
    hex::encode(random_bytes)
}

/// Authenticated caller identity, passed explicitly to every operation
/// that needs it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// User ID
    pub id: Uuid,

    /// Username
    pub username: String,

    /// Role carried by the credential
    pub role: Role,

    /// Back-office staff flag
    pub is_staff: bool,
}

impl Identity {
    /// Admin role check
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admin role or back-office staff
    pub fn is_admin_or_staff(&self) -> bool {
        self.is_admin() || self.is_staff
    }

    /// Moderator, admin, or staff: may act on objects they do not own
    pub fn is_privileged(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Moderator) || self.is_staff
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID)
    pub sub: String,

    /// Username
    pub username: String,

    /// Role at issuance time
    pub role: Role,

    /// Staff flag at issuance time
    #[serde(default)]
    pub staff: bool,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl JwtClaims {
    /// Convert validated claims into a caller identity
    pub fn into_identity(self) -> Result<Identity> {
        let id = Uuid::parse_str(&self.sub).map_err(|_| ApiError::InvalidToken)?;

        Ok(Identity {
            id,
            username: self.username,
            role: self.role,
            is_staff: self.staff,
        })
    }
}

/// JWT token manager
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager with the given secret
    pub fn new(secret: &str, expiration_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiration_secs: expiration_secs as i64,
        }
    }

    /// Generate a new JWT token binding the user's identity and role
    pub fn generate_token(
        &self,
        user_id: Uuid,
        username: &str,
        role: Role,
        is_staff: bool,
    ) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.expiration_secs);

        let claims = JwtClaims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role,
            staff: is_staff,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            ApiError::Internal {
                message: format!("Failed to generate token: {}", e),
            }
        })
    }

    /// Validate and decode a JWT token
    pub fn validate_token(&self, token: &str) -> Result<JwtClaims> {
        decode::<JwtClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => ApiError::ExpiredToken,
                _ => ApiError::InvalidToken,
            })
    }
}

/// Extract a bearer token from an Authorization header value
pub fn extract_bearer(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// Axum extractor requiring an authenticated caller (401 otherwise)
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

/// Axum extractor for endpoints open to anonymous callers.
/// A missing header yields None; a present but invalid credential is
/// still rejected with 401.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<Identity>);

fn identity_from_parts(parts: &Parts, jwt: &JwtManager) -> Result<Option<Identity>> {
    let Some(header) = parts.headers.get("authorization") else {
        return Ok(None);
    };

    let header = header.to_str().map_err(|_| ApiError::InvalidToken)?;
    let token = extract_bearer(header).ok_or_else(|| ApiError::Unauthorized {
        message: "Authorization header is not a bearer token".to_string(),
    })?;

    let claims = jwt.validate_token(token)?;
    Ok(Some(claims.into_identity()?))
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<JwtManager>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let jwt = Arc::<JwtManager>::from_ref(state);

        match identity_from_parts(parts, &jwt)? {
            Some(identity) => Ok(AuthUser(identity)),
            None => Err(ApiError::Unauthorized {
                message: "Missing Authorization header".to_string(),
            }),
        }
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    Arc<JwtManager>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let jwt = Arc::<JwtManager>::from_ref(state);
        Ok(MaybeAuthUser(identity_from_parts(parts, &jwt)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Role) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            username: "reader".to_string(),
            role,
            is_staff: false,
        }
    }

    #[test]
    fn test_validate_username_accepts_word_chars() {
        for name in ["capote", "truman.capote", "t@c", "t+c", "t-c", "T_C_42"] {
            assert!(validate_username(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_validate_username_rejects_me_case_insensitive() {
        for name in ["me", "Me", "ME", "mE"] {
            assert!(validate_username(name).is_err(), "{name} should be rejected");
        }
    }

    #[test]
    fn test_validate_username_rejects_bad_characters() {
        for name in ["with space", "semi;colon", "sla/sh", "", "quo\"te"] {
            assert!(validate_username(name).is_err(), "{name:?} should be rejected");
        }
    }

    #[test]
    fn test_validate_username_rejects_overlong() {
        let name = "a".repeat(USERNAME_MAX_LEN + 1);
        assert!(validate_username(&name).is_err());
    }

    #[test]
    fn test_confirmation_code_shape() {
        let code = generate_confirmation_code();
        assert_eq!(code.len(), 32);
        assert!(code.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_confirmation_codes_are_unique() {
        let a = generate_confirmation_code();
        let b = generate_confirmation_code();
        assert_ne!(a, b);
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer("abc123"), None);
        assert_eq!(extract_bearer("Basic abc"), None);
    }

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test_secret", 3600);

        let user_id = Uuid::new_v4();
        let token = manager
            .generate_token(user_id, "capote", Role::Moderator, false)
            .unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.username, "capote");
        assert_eq!(claims.role, Role::Moderator);
        assert!(!claims.staff);

        let identity = claims.into_identity().unwrap();
        assert_eq!(identity.id, user_id);
        assert_eq!(identity.role, Role::Moderator);
    }

    #[test]
    fn test_jwt_rejects_garbage() {
        let manager = JwtManager::new("test_secret", 3600);
        assert!(matches!(
            manager.validate_token("not-a-token"),
            Err(ApiError::InvalidToken)
        ));
    }

    #[test]
    fn test_jwt_rejects_wrong_key() {
        let signer = JwtManager::new("secret_a", 3600);
        let verifier = JwtManager::new("secret_b", 3600);

        let token = signer
            .generate_token(Uuid::new_v4(), "capote", Role::User, false)
            .unwrap();
        assert!(matches!(
            verifier.validate_token(&token),
            Err(ApiError::InvalidToken)
        ));
    }

    #[test]
    fn test_identity_privilege_levels() {
        assert!(!identity(Role::User).is_privileged());
        assert!(identity(Role::Moderator).is_privileged());
        assert!(identity(Role::Admin).is_privileged());

        let mut staff = identity(Role::User);
        staff.is_staff = true;
        assert!(staff.is_privileged());
        assert!(staff.is_admin_or_staff());
        assert!(!staff.is_admin());
    }
}
