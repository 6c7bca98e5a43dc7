use axum::extract::{Json, Query, State};
use contracts::system::auth::{LoginRequest, LoginResponse, VerifyTokenResponse};
use serde::Deserialize;

use crate::error::ApiError;
use crate::system::auth::{jwt, password};
use crate::AppState;

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    tracing::info!("Login attempt for user: {}", request.email);

    let identity = state
        .users
        .find_by_email(&request.email)
        .await
        .map_err(|e| {
            tracing::error!("Identity lookup failed for {}: {:#}", request.email, e);
            ApiError::Internal("Could not validate credentials".to_string())
        })?;

    let authenticated = identity
        .filter(|user| user.is_active)
        .filter(|user| password::verify_password(&request.password, &user.password_hash));

    let Some(user) = authenticated else {
        tracing::warn!("Login failed for user: {}", request.email);
        return Err(ApiError::Unauthorized(
            "Incorrect email or password".to_string(),
        ));
    };

    let access_token = jwt::issue_access_token(&state.auth, &user.email).map_err(|e| {
        tracing::error!("Token issuance failed: {:#}", e);
        ApiError::Internal("Could not issue access token".to_string())
    })?;

    tracing::info!("Login successful for user: {}", user.email);
    Ok(Json(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

#[derive(Deserialize)]
pub struct VerifyTokenParams {
    pub token: String,
}

/// POST /auth/verify-token
pub async fn verify_token(
    State(state): State<AppState>,
    Query(params): Query<VerifyTokenParams>,
) -> Result<Json<VerifyTokenResponse>, ApiError> {
    let claims = jwt::validate_token(&state.auth, &params.token)
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

    let user = state
        .users
        .find_by_email(&claims.sub)
        .await
        .map_err(|e| {
            tracing::error!("Identity lookup failed for {}: {:#}", claims.sub, e);
            ApiError::Internal("Could not validate credentials".to_string())
        })?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

    tracing::info!("Token successfully verified for user: {}", user.email);
    Ok(Json(VerifyTokenResponse {
        valid: true,
        email: user.email,
    }))
}
