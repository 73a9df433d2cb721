//! Contains stores that keep each collection in a flat JSON file.
//!
//! Each store reads its file once on open and serves reads from memory.
//! Writes go to disk before they become visible to readers.

mod file;
mod transaction;
mod user;

pub use transaction::JsonTransactionStore;
pub use user::JsonUserStore;

use std::{fs, path::Path};

use crate::{Error, config::CorruptionPolicy};

/// The file in the data directory that holds the users.
pub const USERS_FILE: &str = "users.json";

/// The file in the data directory that holds the transactions.
pub const TRANSACTIONS_FILE: &str = "transactions.json";

/// Open the user and transaction stores in `data_dir`, creating the
/// directory and the files if they do not exist.
///
/// # Errors
/// Returns [Error::Io] if the directory or files cannot be created or read,
/// or [Error::CorruptStore] if a file is corrupt and `policy` is
/// [CorruptionPolicy::Fail].
pub fn open_json_stores(
    data_dir: &Path,
    policy: CorruptionPolicy,
) -> Result<(JsonUserStore, JsonTransactionStore), Error> {
    fs::create_dir_all(data_dir)?;

    let users = JsonUserStore::open(data_dir.join(USERS_FILE), policy)?;
    let transactions = JsonTransactionStore::open(data_dir.join(TRANSACTIONS_FILE), policy)?;

    Ok((users, transactions))
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use crate::config::CorruptionPolicy;

    use super::{TRANSACTIONS_FILE, USERS_FILE, open_json_stores};

    #[test]
    fn creates_data_dir_and_files() {
        let dir = tempdir().unwrap();
        let data_dir = dir.path().join("nested").join("data");

        open_json_stores(&data_dir, CorruptionPolicy::Fail).unwrap();

        assert!(data_dir.join(USERS_FILE).is_file());
        assert!(data_dir.join(TRANSACTIONS_FILE).is_file());
    }
}
