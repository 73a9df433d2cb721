//! Defines functions for carrying the session token in a cookie.

use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

/// The name of the cookie that holds the session token.
pub(crate) const COOKIE_TOKEN: &str = "token";

/// Add the session token cookie to the cookie jar.
///
/// The cookie expires together with the token, after `duration`.
pub(crate) fn set_token_cookie(jar: CookieJar, token: &str, duration: Duration) -> CookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, token.to_owned()))
            .path("/")
            .max_age(duration)
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Set the token cookie to an invalid value and set its max age to zero, which should delete the cookie on the client side.
pub(crate) fn invalidate_token_cookie(jar: CookieJar) -> CookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, "deleted"))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}
