//! Defines the claims carried by session tokens and how tokens are signed and checked.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{
    Error,
    models::{User, UserID},
};

/// The contents of a JSON Web Token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The ID of the user the token was issued to, as a string.
    pub sub: String,
    /// Email associated with the token.
    pub email: String,
    /// The time the token was issued, in seconds since the Unix epoch.
    pub iat: i64,
    /// The expiry time of the token, in seconds since the Unix epoch.
    pub exp: i64,
    /// A unique ID for the token, used to revoke it.
    pub jti: String,
}

impl Claims {
    /// The user the token was issued to.
    ///
    /// # Errors
    /// Returns [Error::InvalidToken] if the subject is not a user ID.
    pub fn user_id(&self) -> Result<UserID, Error> {
        self.sub
            .parse()
            .map(UserID::new)
            .map_err(|_| Error::InvalidToken)
    }
}

/// Sign a token for `user` that expires `duration` from now.
///
/// # Errors
/// Returns [Error::TokenCreation] if the expiry is out of range or the token
/// could not be signed.
pub(crate) fn encode_token(
    user: &User,
    duration: Duration,
    encoding_key: &EncodingKey,
) -> Result<String, Error> {
    let now = OffsetDateTime::now_utc();
    let expires_at = now
        .checked_add(duration)
        .ok_or_else(|| Error::TokenCreation(format!("token lifetime {duration} is too long")))?;
    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.to_string(),
        iat: now.unix_timestamp(),
        exp: expires_at.unix_timestamp(),
        jti: Uuid::new_v4().to_string(),
    };

    encode(&Header::new(Algorithm::HS256), &claims, encoding_key)
        .map_err(|error| Error::TokenCreation(error.to_string()))
}

/// Check the signature and expiry of `token` and return its claims.
///
/// # Errors
/// Returns [Error::InvalidToken] if the token is malformed, was signed with a
/// different key, or has expired.
pub(crate) fn decode_token(token: &str, decoding_key: &DecodingKey) -> Result<Claims, Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<Claims>(token, decoding_key, &validation)
        .map(|token_data| token_data.claims)
        .map_err(|error| {
            tracing::debug!("Rejected token: {error}");
            Error::InvalidToken
        })
}
