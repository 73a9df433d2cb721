//! Contains traits and implementations for objects that store the domain [models](crate::models).
//!
//! Both the SQLite and the JSON file backends implement the same traits, the
//! backend is chosen when the app state is built.

use email_address::EmailAddress;
use time::OffsetDateTime;

use crate::{
    Error,
    models::{NewTransaction, NewUser, Transaction, User, UserID},
};

pub mod json;
pub mod sqlite;

pub use json::{JsonTransactionStore, JsonUserStore, open_json_stores};
pub use sqlite::{SQLiteTransactionStore, SQLiteUserStore, open_sqlite_stores};

/// Handles the creation and retrieval of User objects.
pub trait UserStore {
    /// Create a new user.
    ///
    /// Returns [Error::DuplicateEmail] if another user already has the email,
    /// compared case-insensitively.
    fn create(&mut self, new_user: NewUser) -> Result<User, Error>;

    /// Get a user by their ID.
    ///
    /// Returns [Error::NotFound] if no user with the given ID exists.
    fn get(&self, id: UserID) -> Result<User, Error>;

    /// Get a user by their email.
    ///
    /// Returns [Error::NotFound] if no user with the given email exists.
    fn get_by_email(&self, email: &EmailAddress) -> Result<User, Error>;
}

/// Handles the append-only storage of transactions.
pub trait TransactionStore {
    /// Durably store a new transaction and return it with its ID and timestamp.
    ///
    /// Either the record is fully persisted or an error is returned and no
    /// record becomes visible.
    fn append(&mut self, transaction: NewTransaction) -> Result<Transaction, Error>;

    /// All transactions belonging to `user_id`, in insertion order.
    ///
    /// Returns an empty vector if the user has no transactions.
    fn list_by_user(&self, user_id: UserID) -> Result<Vec<Transaction>, Error>;
}

/// Pick the timestamp for a new transaction so that timestamps never decrease
/// in insertion order.
///
/// `requested` is the timestamp the caller asked for, if any, and `latest` the
/// timestamp of the newest stored transaction.
///
/// # Errors
///
/// Returns [Error::TimestampOutOfOrder] if `requested` is earlier than `latest`.
pub(crate) fn resolve_timestamp(
    requested: Option<OffsetDateTime>,
    latest: Option<OffsetDateTime>,
) -> Result<OffsetDateTime, Error> {
    match (requested, latest) {
        (Some(requested), Some(latest)) if requested < latest => Err(Error::TimestampOutOfOrder),
        (Some(requested), _) => Ok(requested),
        // The system clock may step backwards, never let the ledger follow it.
        (None, Some(latest)) => Ok(OffsetDateTime::now_utc().max(latest)),
        (None, None) => Ok(OffsetDateTime::now_utc()),
    }
}
