//! Password checking and bcrypt hashing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Error;

/// bcrypt ignores everything after this many bytes, so longer passwords are rejected.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// A plain text password that is known to be hashable.
///
/// Its [Display](fmt::Display) output is masked so it can be logged safely.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Check `raw_password` and wrap it.
    ///
    /// # Errors
    ///
    /// Returns [Error::MissingField] for an empty password and
    /// [Error::PasswordTooLong] when it exceeds [MAX_PASSWORD_BYTES].
    pub fn new(raw_password: &str) -> Result<Self, Error> {
        if raw_password.is_empty() {
            return Err(Error::MissingField("password"));
        }

        if raw_password.len() > MAX_PASSWORD_BYTES {
            return Err(Error::PasswordTooLong(MAX_PASSWORD_BYTES));
        }

        Ok(Self(raw_password.to_owned()))
    }
}

impl fmt::Display for ValidatedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("********")
    }
}

/// A salted bcrypt hash of a user's password.
///
/// Only the hash is ever stored, the plain text password is dropped as soon
/// as it has been hashed or checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// The bcrypt cost used outside of tests.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash `password` with `cost` rounds of bcrypt.
    ///
    /// # Errors
    ///
    /// Returns [Error::HashingError] if bcrypt rejects the cost.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        bcrypt::hash(&password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Wrap a hash read back from a store.
    ///
    /// No check is made that `raw_password_hash` is a bcrypt hash. A bad hash
    /// makes [PasswordHash::verify] fail, it cannot let a wrong password in.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_owned())
    }

    /// Validate and hash `raw_password` in one step.
    pub fn from_raw_password(raw_password: &str, cost: u32) -> Result<Self, Error> {
        Self::new(ValidatedPassword::new(raw_password)?, cost)
    }

    /// Whether `raw_password` is the password this hash was made from.
    pub fn verify(&self, raw_password: &str) -> Result<bool, bcrypt::BcryptError> {
        bcrypt::verify(raw_password, &self.0)
    }

    /// The hash in modular crypt format, e.g. `$2b$12$...`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
