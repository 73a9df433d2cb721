//! The state needed to issue, check and revoke session tokens.

use std::sync::{Arc, OnceLock};

use time::Duration;
use uuid::Uuid;

use crate::{
    Error,
    auth::{
        RevocationList,
        token::{Claims, decode_token, encode_token},
    },
    config::AuthConfig,
    models::{PasswordHash, User},
};

/// The state needed for the auth handlers and the [AuthenticatedUser](crate::auth::AuthenticatedUser) extractor.
#[derive(Clone)]
pub struct AuthState {
    config: Arc<AuthConfig>,
    revocations: RevocationList,
    /// Checked against when the email is unknown, so that case costs as much
    /// as a wrong password.
    decoy_hash: Arc<OnceLock<PasswordHash>>,
}

impl AuthState {
    /// Create the auth state from `config` with an empty revocation list.
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config: Arc::new(config),
            revocations: RevocationList::new(),
            decoy_hash: Arc::new(OnceLock::new()),
        }
    }

    /// How long issued tokens remain valid.
    pub fn token_duration(&self) -> Duration {
        self.config.token_duration
    }

    /// The bcrypt cost for hashing new passwords.
    pub fn password_cost(&self) -> u32 {
        self.config.password_cost
    }

    /// Whether `password` belongs to `user`.
    ///
    /// With no user the password is still checked, against a decoy hash of the
    /// same cost, and the result is always `false`. Unknown emails then take
    /// as long to reject as wrong passwords.
    ///
    /// # Errors
    /// Returns [Error::HashingError] if bcrypt fails.
    pub fn check_password(&self, user: Option<&User>, password: &str) -> Result<bool, Error> {
        let hash = match user {
            Some(user) => &user.password_hash,
            None => self.decoy_hash()?,
        };

        let is_match = hash.verify(password).map_err(|error| {
            tracing::error!("Error verifying password: {error}");
            Error::HashingError(error.to_string())
        })?;

        Ok(is_match && user.is_some())
    }

    fn decoy_hash(&self) -> Result<&PasswordHash, Error> {
        if let Some(hash) = self.decoy_hash.get() {
            return Ok(hash);
        }

        let hash =
            PasswordHash::from_raw_password(&Uuid::new_v4().to_string(), self.password_cost())?;

        Ok(self.decoy_hash.get_or_init(|| hash))
    }

    /// Build the decoy hash now rather than on the first unknown email.
    ///
    /// # Errors
    /// Returns [Error::HashingError] if the configured cost is invalid.
    pub fn prepare(&self) -> Result<(), Error> {
        self.decoy_hash().map(|_| ())
    }

    #[cfg(test)]
    pub(crate) fn has_decoy_hash(&self) -> bool {
        self.decoy_hash.get().is_some()
    }

    /// Sign a new session token for `user`.
    ///
    /// # Errors
    /// Returns [Error::TokenCreation] if the token could not be signed.
    pub fn issue(&self, user: &User) -> Result<String, Error> {
        encode_token(user, self.config.token_duration, self.config.encoding_key())
    }

    /// Check `token` and return its claims.
    ///
    /// # Errors
    /// Returns [Error::InvalidToken] if the token is malformed, tampered
    /// with, expired or revoked.
    pub fn verify(&self, token: &str) -> Result<Claims, Error> {
        let claims = decode_token(token, self.config.decoding_key())?;

        if self.revocations.is_revoked(&claims.jti)? {
            tracing::debug!("Rejected revoked token {}", claims.jti);
            return Err(Error::InvalidToken);
        }

        Ok(claims)
    }

    /// Reject the token described by `claims` from now until it expires.
    ///
    /// # Errors
    /// Returns [Error::DatabaseLockError] if the revocation list lock is poisoned.
    pub fn revoke(&self, claims: &Claims) -> Result<(), Error> {
        self.revocations.revoke(&claims.jti, claims.exp)
    }
}
