//! Defines the endpoint for logging out.

use axum::{Json, extract::State, http::HeaderMap};
use axum_extra::extract::CookieJar;
use serde_json::{Value, json};

use crate::{
    Error,
    auth::{AuthState, cookie::invalidate_token_cookie, extractor::token_from_headers},
};

/// A route handler for logging out.
///
/// Revokes the request's token if it is still valid and clears the token
/// cookie. Logging out without a token, or with one that is already invalid,
/// also succeeds.
///
/// # Errors
///
/// Returns [Error::DatabaseLockError] if the revocation list could not be updated.
pub async fn log_out(
    State(auth): State<AuthState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Value>), Error> {
    if let Some(token) = token_from_headers(&headers) {
        match auth.verify(&token) {
            Ok(claims) => {
                auth.revoke(&claims)?;
                tracing::info!("User {} logged out", claims.sub);
            }
            Err(_) => tracing::debug!("Log out with an invalid token, nothing to revoke"),
        }
    }

    Ok((
        invalidate_token_cookie(jar),
        Json(json!({ "message": "Logged out successfully" })),
    ))
}
