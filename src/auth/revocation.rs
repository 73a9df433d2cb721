//! Keeps track of session tokens that were logged out before they expired.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use time::OffsetDateTime;

use crate::Error;

/// A denylist of token IDs (`jti` claims).
///
/// Each entry is kept until the token it refers to would have expired
/// anyway. Expired entries are dropped whenever a new token is revoked.
/// The list lives in memory only, so it is empty after a restart.
#[derive(Debug, Clone, Default)]
pub struct RevocationList(Arc<Mutex<HashMap<String, i64>>>);

impl RevocationList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the token with ID `jti` until `expires_at`, a Unix timestamp in seconds.
    ///
    /// # Errors
    /// Returns [Error::DatabaseLockError] if the lock is poisoned.
    pub fn revoke(&self, jti: &str, expires_at: i64) -> Result<(), Error> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let mut revoked = self.0.lock().map_err(|_| Error::DatabaseLockError)?;

        revoked.retain(|_, expiry| *expiry >= now);
        revoked.insert(jti.to_owned(), expires_at);

        Ok(())
    }

    /// Whether the token with ID `jti` has been revoked.
    ///
    /// # Errors
    /// Returns [Error::DatabaseLockError] if the lock is poisoned.
    pub fn is_revoked(&self, jti: &str) -> Result<bool, Error> {
        let revoked = self.0.lock().map_err(|_| Error::DatabaseLockError)?;

        Ok(revoked.contains_key(jti))
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.0.lock().map(|revoked| revoked.len()).unwrap_or_default()
    }
}
