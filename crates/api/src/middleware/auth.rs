//! Authentication extractors over the `Authorization: Bearer` header.
//!
//! Token verification is stateless: the extractors check signature, issuer,
//! audience, and expiry against the token alone and never touch the store.
//! Role checks read the token's embedded claims, so a role change only takes
//! effect once the user re-authenticates.

use axum::{
    Json,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use clementine_core::UserId;

use crate::services::token::Claims;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// Exposes the subject's user ID and the verified claims to the handler. A
/// missing, malformed, or invalid token rejects with 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn me(user: CurrentUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.claims.name)
/// }
/// ```
pub struct CurrentUser {
    /// The user ID carried in the token's subject claim.
    pub user_id: UserId,
    /// The full verified claim set.
    pub claims: Claims,
}

/// Error returned when authentication is required but missing or invalid.
pub enum AuthRejection {
    /// No `Authorization: Bearer` header on the request.
    MissingToken,
    /// The token failed verification.
    InvalidToken,
    /// The token verifies but lacks the required role claim.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingToken => (StatusCode::UNAUTHORIZED, "Missing bearer token"),
            Self::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Admin role required"),
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let token = bearer_token(parts).ok_or(AuthRejection::MissingToken)?;

        let claims = state
            .token_issuer()
            .verify(token)
            .map_err(|_| AuthRejection::InvalidToken)?;

        // A subject that doesn't name a user is as good as no token.
        let user_id = claims.user_id().ok_or(AuthRejection::InvalidToken)?;

        Ok(Self { user_id, claims })
    }
}

/// Extractor that requires a valid bearer token carrying the Admin role.
///
/// Rejects with 401 when the token is missing or invalid, and 403 when it
/// verifies but the Admin claim is absent. The check reads the token's
/// embedded claims only, never the store.
///
/// # Example
///
/// ```rust,ignore
/// async fn delete_category(
///     _admin: RequireAdmin,
///     Path(id): Path<i32>,
/// ) -> impl IntoResponse {
///     // only admins get here
/// }
/// ```
pub struct RequireAdmin {
    /// The admin's user ID.
    pub user_id: UserId,
    /// The full verified claim set.
    pub claims: Claims,
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;

        if !user.claims.is_admin() {
            return Err(AuthRejection::Forbidden);
        }

        Ok(Self {
            user_id: user.user_id,
            claims: user.claims,
        })
    }
}

/// Pull the token out of the `Authorization: Bearer` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/cart");
        if let Some(value) = value {
            builder = builder.header(AUTHORIZATION, value);
        }
        let (parts, ()) = builder.body(()).expect("valid request").into_parts();
        parts
    }

    #[test]
    fn test_bearer_token_extracted() {
        let parts = parts_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts), Some("abc.def.ghi"));
    }

    #[test]
    fn test_missing_header_yields_none() {
        let parts = parts_with_auth(None);
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_non_bearer_scheme_yields_none() {
        let parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_rejection_statuses() {
        assert_eq!(
            AuthRejection::MissingToken.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthRejection::InvalidToken.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthRejection::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }
}
