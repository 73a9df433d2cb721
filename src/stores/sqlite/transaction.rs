//! Implements a SQLite backed transaction store.
use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use rusqlite::{Connection, OptionalExtension, Row, types::Type};
use rust_decimal::Decimal;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{Amount, NewTransaction, Transaction, TransactionKind, UserID},
    stores::{TransactionStore, resolve_timestamp},
};

/// Stores transactions in a SQLite database.
///
/// Amounts are stored as decimal text so that they read back exactly, and
/// timestamps as RFC 3339 text.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl TransactionStore for SQLiteTransactionStore {
    /// Insert a transaction into the database.
    ///
    /// The latest timestamp is read and the row inserted inside one SQL
    /// transaction, so concurrent appends cannot interleave between the two.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::TimestampOutOfOrder] if the requested timestamp is earlier than the newest stored one,
    /// - [Error::DatabaseLockError] if the connection lock is poisoned,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn append(&mut self, transaction: NewTransaction) -> Result<Transaction, Error> {
        let connection = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;
        let tx = connection.unchecked_transaction()?;

        let latest = tx
            .query_row(
                "SELECT created_at FROM \"transaction\" ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get::<_, String>(0),
            )
            .optional()?
            .map(|raw| parse_timestamp(&raw, 0))
            .transpose()?;
        let timestamp = resolve_timestamp(transaction.timestamp, latest)?;
        let raw_timestamp = timestamp
            .format(&Rfc3339)
            .map_err(|error| Error::CorruptStore(error.to_string()))?;

        let transaction = tx
            .prepare(
                "INSERT INTO \"transaction\" (user_id, amount, kind, description, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 RETURNING id, user_id, amount, kind, description, created_at",
            )?
            .query_row(
                (
                    transaction.user_id.as_i64(),
                    transaction.amount.to_string(),
                    transaction.kind.as_str(),
                    &transaction.description,
                    raw_timestamp,
                ),
                Self::map_row,
            )?;

        tx.commit()?;

        Ok(transaction)
    }

    /// Get the transactions of `user_id` in the order they were inserted.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] there is a SQL error.
    fn list_by_user(&self, user_id: UserID) -> Result<Vec<Transaction>, Error> {
        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .prepare(
                "SELECT id, user_id, amount, kind, description, created_at
                 FROM \"transaction\" WHERE user_id = :user_id ORDER BY id ASC",
            )?
            .query_map(&[(":user_id", &user_id.as_i64())], Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
            .collect()
    }
}

impl CreateTable for SQLiteTransactionStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS \"transaction\" (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id INTEGER NOT NULL,
                    amount TEXT NOT NULL,
                    kind TEXT NOT NULL CHECK (kind IN ('deposit', 'withdrawal')),
                    description TEXT NOT NULL,
                    created_at TEXT NOT NULL
                    )",
            (),
        )?;

        connection.execute(
            "CREATE INDEX IF NOT EXISTS idx_transaction_user_id ON \"transaction\"(user_id)",
            (),
        )?;

        Ok(())
    }
}

fn conversion_error(
    column: usize,
    error: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(error))
}

fn parse_timestamp(raw: &str, column: usize) -> Result<OffsetDateTime, rusqlite::Error> {
    OffsetDateTime::parse(raw, &Rfc3339).map_err(|error| conversion_error(column, error))
}

impl MapRow for SQLiteTransactionStore {
    type ReturnType = Transaction;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let raw_user_id = row.get(offset + 1)?;
        let raw_amount: String = row.get(offset + 2)?;
        let raw_kind: String = row.get(offset + 3)?;
        let description = row.get(offset + 4)?;
        let raw_timestamp: String = row.get(offset + 5)?;

        let amount = Decimal::from_str(&raw_amount)
            .map_err(|error| conversion_error(offset + 2, error))
            .and_then(|value| {
                Amount::new(value).map_err(|error| conversion_error(offset + 2, error))
            })?;
        let kind = TransactionKind::from_str(&raw_kind)
            .map_err(|error| conversion_error(offset + 3, error))?;
        let timestamp = parse_timestamp(&raw_timestamp, offset + 5)?;

        Ok(Transaction {
            id,
            user_id: UserID::new(raw_user_id),
            amount,
            kind,
            description,
            timestamp,
        })
    }
}
