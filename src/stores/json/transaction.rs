//! Implements a transaction store backed by a JSON file.
use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use crate::{
    Error,
    config::CorruptionPolicy,
    models::{NewTransaction, Transaction, UserID},
    stores::{TransactionStore, resolve_timestamp},
};

use super::file::JsonFile;

/// Stores transactions for all users in a single JSON file.
///
/// Clones share the same underlying file.
#[derive(Debug, Clone)]
pub struct JsonTransactionStore {
    file: Arc<Mutex<JsonFile<Transaction>>>,
}

impl JsonTransactionStore {
    /// Open the store at `path`, creating the file if it does not exist.
    ///
    /// # Errors
    /// Returns [Error::CorruptStore] if the file is corrupt and `policy` is
    /// [CorruptionPolicy::Fail], or [Error::Io] if the file cannot be read.
    pub fn open(path: impl Into<PathBuf>, policy: CorruptionPolicy) -> Result<Self, Error> {
        Ok(Self {
            file: Arc::new(Mutex::new(JsonFile::open(path, policy)?)),
        })
    }
}

impl TransactionStore for JsonTransactionStore {
    fn append(&mut self, transaction: NewTransaction) -> Result<Transaction, Error> {
        let mut file = self.file.lock().map_err(|_| Error::DatabaseLockError)?;

        let latest = file.records().last();
        let timestamp = resolve_timestamp(
            transaction.timestamp,
            latest.map(|transaction| transaction.timestamp),
        )?;
        let id = latest.map_or(1, |transaction| transaction.id + 1);

        file.append(transaction.into_transaction(id, timestamp))
            .cloned()
    }

    fn list_by_user(&self, user_id: UserID) -> Result<Vec<Transaction>, Error> {
        Ok(self
            .file
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .records()
            .iter()
            .filter(|transaction| transaction.user_id == user_id)
            .cloned()
            .collect())
    }
}
