//! Contains the SQLite backed stores and a convenience function for opening them.

mod transaction;
mod user;

pub use transaction::SQLiteTransactionStore;
pub use user::SQLiteUserStore;

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, db::initialize};

/// Creates the user and transaction stores for a SQLite database.
///
/// This function will modify the database by adding the tables for the domain
/// models to the database, if they do not exist already. Both stores share the
/// one connection.
///
/// # Errors
/// Returns an [Error::SqlError] if the tables could not be created.
pub fn open_sqlite_stores(
    db_connection: Connection,
) -> Result<(SQLiteUserStore, SQLiteTransactionStore), Error> {
    initialize(&db_connection)?;

    let connection = Arc::new(Mutex::new(db_connection));

    Ok((
        SQLiteUserStore::new(connection.clone()),
        SQLiteTransactionStore::new(connection),
    ))
}
