use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};

use crate::error::ApiError;
use crate::system::users::Identity;

/// Extractor for getting the authenticated identity resolved by the
/// `require_auth` middleware.
/// Usage in handlers: `async fn handler(CurrentUser(identity): CurrentUser) -> Response`
pub struct CurrentUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| ApiError::Unauthorized("Could not validate credentials".to_string()))
    }
}
