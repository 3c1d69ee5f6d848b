//! Signup and token exchange handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use critiq_common::{
    auth::validate_username,
    errors::Result,
    metrics, notify,
};

/// Request to sign up or re-request a confirmation code
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email, length(max = 254))]
    pub email: String,

    #[validate(length(min = 1, max = 150))]
    pub username: String,
}

/// Echo of the accepted signup data
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub username: String,
    pub email: String,
}

/// Request to exchange a confirmation code for an access token
#[derive(Debug, Deserialize, Validate)]
pub struct TokenRequest {
    #[validate(length(min = 1, max = 150))]
    pub username: String,

    #[validate(length(min = 1, max = 150))]
    pub confirmation_code: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Create the user if absent (an existing username must present its
/// stored email), rotate the confirmation code, and dispatch it.
/// Returns as soon as the code is persisted; delivery is best-effort.
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<SignupResponse>> {
    request.validate()?;
    validate_username(&request.username)?;

    let (user, code) = state
        .repo
        .issue_confirmation_code(&request.username, &request.email)
        .await?;

    metrics::record_signup();

    tracing::info!(username = %user.username, "Confirmation code issued");

    notify::dispatch(
        state.notifier.clone(),
        user.email.clone(),
        "Confirmation code".to_string(),
        format!("Your confirmation code is: {}", code),
    );

    Ok(Json(SignupResponse {
        username: user.username,
        email: user.email,
    }))
}

/// Exchange a valid (username, confirmation code) pair for a signed
/// bearer token. Each successful exchange mints a fresh token.
pub async fn token(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> Result<(StatusCode, Json<TokenResponse>)> {
    request.validate()?;

    let user = state
        .repo
        .verify_confirmation_code(&request.username, &request.confirmation_code)
        .await?;

    let token = state
        .jwt
        .generate_token(user.id, &user.username, user.role(), user.is_staff)?;

    metrics::record_token_issued();

    tracing::info!(username = %user.username, "Access token issued");

    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_request_validation() {
        let ok = SignupRequest {
            email: "reader@example.com".to_string(),
            username: "reader".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad_email = SignupRequest {
            email: "not-an-email".to_string(),
            username: "reader".to_string(),
        };
        assert!(bad_email.validate().is_err());

        let empty_username = SignupRequest {
            email: "reader@example.com".to_string(),
            username: String::new(),
        };
        assert!(empty_username.validate().is_err());
    }

    #[test]
    fn test_token_request_validation() {
        let ok = TokenRequest {
            username: "reader".to_string(),
            confirmation_code: "deadbeef".to_string(),
        };
        assert!(ok.validate().is_ok());

        let empty_code = TokenRequest {
            username: "reader".to_string(),
            confirmation_code: String::new(),
        };
        assert!(empty_code.validate().is_err());
    }
}
