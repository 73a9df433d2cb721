//! Extracts the authenticated user from a request's session token.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, request::Parts},
};
use axum_extra::{
    extract::CookieJar,
    headers::{Authorization, HeaderMapExt, authorization::Bearer},
};

use crate::{
    Error,
    auth::{AuthState, cookie::COOKIE_TOKEN},
    models::UserID,
};

/// Find the session token in `headers`.
///
/// The `Authorization: Bearer` header takes precedence over the token cookie.
pub(crate) fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() {
        return Some(bearer.token().to_owned());
    }

    CookieJar::from_headers(headers)
        .get(COOKIE_TOKEN)
        .map(|cookie| cookie.value().to_owned())
}

/// The user that made the request, resolved from a valid session token.
///
/// Handlers that take this extractor reject requests without a valid token
/// with 401 Unauthorized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuthenticatedUser {
    /// The ID of the user the token was issued to.
    pub user_id: UserID,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers).ok_or(Error::MissingToken)?;
        let auth_state = AuthState::from_ref(state);

        let user_id = auth_state.verify(&token)?.user_id()?;

        Ok(Self { user_id })
    }
}
