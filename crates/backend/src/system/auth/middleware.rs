use axum::{
    body::Body, extract::Request, extract::State, middleware::Next, response::Response,
};

use crate::error::ApiError;
use crate::AppState;

/// Middleware that requires a valid bearer token resolving to a known
/// identity. The resolved identity lands in request extensions for the
/// `CurrentUser` extractor.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Could not validate credentials".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Could not validate credentials".to_string()))?;

    let identity =
        super::resolve_identity(state.users.as_ref(), &state.auth, token).await?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}
