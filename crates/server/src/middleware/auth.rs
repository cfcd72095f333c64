//! Bearer-token extractors.
//!
//! Protected handlers take [`RequireUser`] or [`RequireAdmin`]; the token is
//! read from `Authorization: Bearer <token>` and resolved against the store on
//! every request.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};

use minimart_core::SessionToken;

use crate::error::{AppError, set_sentry_user};
use crate::models::{AdminUser, CurrentUser};
use crate::state::AppState;

/// Extractor that requires a valid session token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireUser(pub CurrentUser);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let user = state.auth().authenticate(&token).await?;
        set_sentry_user(&user.id, user.username.as_str());
        Ok(Self(user))
    }
}

/// Extractor that requires a session token belonging to an administrator.
///
/// Non-admin users are rejected with 403.
pub struct RequireAdmin(pub AdminUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let admin = state.auth().authenticate_admin(&token).await?;
        set_sentry_user(&admin.user().id, admin.user().username.as_str());
        Ok(Self(admin))
    }
}

/// Read the session token from the `Authorization` header.
///
/// The header is split on its first space into a scheme, which must be
/// `Bearer` (any case), and a non-empty token.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` if the header is absent and
/// `AppError::BadRequest` if it is malformed.
pub fn bearer_token(headers: &HeaderMap) -> Result<SessionToken, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("missing authorization header".to_string()))?;

    let malformed = || AppError::BadRequest("malformed authorization header".to_string());

    let (scheme, token) = value
        .to_str()
        .map_err(|_| malformed())?
        .split_once(' ')
        .ok_or_else(malformed)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::BadRequest(
            "authorization scheme must be Bearer".to_string(),
        ));
    }

    SessionToken::parse(token).ok_or_else(malformed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_parsed() {
        let token = bearer_token(&headers("Bearer abc-123")).unwrap();
        assert_eq!(token.expose(), "abc-123");

        let token = bearer_token(&headers("bearer xyz")).unwrap();
        assert_eq!(token.expose(), "xyz");
    }

    #[test]
    fn test_missing_header_is_unauthorized() {
        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_malformed_header_is_bad_request() {
        for value in ["abc-123", "Bearer ", "Basic dXNlcjpwYXNz", "Bearer    "] {
            assert!(
                matches!(bearer_token(&headers(value)), Err(AppError::BadRequest(_))),
                "{value:?} should be rejected"
            );
        }
    }
}
