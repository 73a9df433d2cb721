//! Implements a user store backed by a JSON file.
use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use email_address::EmailAddress;

use crate::{
    Error,
    config::CorruptionPolicy,
    models::{NewUser, User, UserID},
    stores::UserStore,
};

use super::file::JsonFile;

/// Stores users in a JSON file.
///
/// Clones share the same underlying file.
#[derive(Debug, Clone)]
pub struct JsonUserStore {
    file: Arc<Mutex<JsonFile<User>>>,
}

impl JsonUserStore {
    /// Open the store at `path`, creating the file if it does not exist.
    ///
    /// A store recovered under [CorruptionPolicy::TreatAsEmpty] hands out IDs
    /// from 1 again, so tokens issued before the recovery would name the new
    /// users. `JWT_SECRET` must be rotated when that happens.
    ///
    /// # Errors
    /// Returns [Error::CorruptStore] if the file is corrupt and `policy` is
    /// [CorruptionPolicy::Fail], or [Error::Io] if the file cannot be read.
    pub fn open(path: impl Into<PathBuf>, policy: CorruptionPolicy) -> Result<Self, Error> {
        let file = JsonFile::open(path, policy)?;

        if let Some(backup) = file.recovered_from() {
            tracing::warn!(
                "User IDs restart at 1 after recovering from {}. Rotate JWT_SECRET, \
                 tokens issued before now would act as the new users",
                backup.display()
            );
        }

        Ok(Self {
            file: Arc::new(Mutex::new(file)),
        })
    }

    /// Whether the store was started empty because its file was corrupt.
    pub fn was_recovered(&self) -> Result<bool, Error> {
        Ok(self
            .file
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .recovered_from()
            .is_some())
    }

    fn find(&self, predicate: impl Fn(&User) -> bool) -> Result<User, Error> {
        self.file
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .records()
            .iter()
            .find(|user| predicate(user))
            .cloned()
            .ok_or(Error::NotFound)
    }
}

fn same_email(a: &EmailAddress, b: &EmailAddress) -> bool {
    a.as_str().eq_ignore_ascii_case(b.as_str())
}

impl UserStore for JsonUserStore {
    fn create(&mut self, new_user: NewUser) -> Result<User, Error> {
        let mut file = self.file.lock().map_err(|_| Error::DatabaseLockError)?;

        if file
            .records()
            .iter()
            .any(|user| same_email(&user.email, &new_user.email))
        {
            return Err(Error::DuplicateEmail);
        }

        let next_id = file
            .records()
            .iter()
            .map(|user| user.id.as_i64())
            .max()
            .unwrap_or(0)
            + 1;

        file.append(new_user.into_user(UserID::new(next_id)))
            .cloned()
    }

    fn get(&self, id: UserID) -> Result<User, Error> {
        self.find(|user| user.id == id)
    }

    fn get_by_email(&self, email: &EmailAddress) -> Result<User, Error> {
        self.find(|user| same_email(&user.email, email))
    }
}

#[cfg(test)]
mod json_user_store_tests {
    use std::str::FromStr;

    use email_address::EmailAddress;
    use tempfile::tempdir;
    use time::macros::date;

    use crate::{
        Error,
        config::CorruptionPolicy,
        models::{Gender, NewUser, PasswordHash, UserID},
        stores::UserStore,
    };

    use super::JsonUserStore;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            first_name: "Grace".to_owned(),
            surname: "Hopper".to_owned(),
            date_of_birth: date!(1985 - 12 - 09),
            gender: Gender::Female,
            email: EmailAddress::from_str(email).unwrap(),
            password_hash: PasswordHash::new_unchecked("hunter2"),
        }
    }

    #[test]
    fn create_assigns_sequential_ids() {
        let dir = tempdir().unwrap();
        let mut store =
            JsonUserStore::open(dir.path().join("users.json"), CorruptionPolicy::Fail).unwrap();

        let first = store.create(new_user("a@x.com")).unwrap();
        let second = store.create(new_user("b@x.com")).unwrap();

        assert_eq!(first.id, UserID::new(1));
        assert_eq!(second.id, UserID::new(2));
    }

    #[test]
    fn create_fails_on_duplicate_email_ignoring_case() {
        let dir = tempdir().unwrap();
        let mut store =
            JsonUserStore::open(dir.path().join("users.json"), CorruptionPolicy::Fail).unwrap();
        let first = store.create(new_user("a@x.com")).unwrap();

        let result = store.create(new_user("A@X.com"));

        assert_eq!(result, Err(Error::DuplicateEmail));
        assert_eq!(store.get(first.id), Ok(first));
    }

    #[test]
    fn users_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");
        let mut store = JsonUserStore::open(&path, CorruptionPolicy::Fail).unwrap();
        let user = store.create(new_user("a@x.com")).unwrap();
        drop(store);

        let reopened = JsonUserStore::open(&path, CorruptionPolicy::Fail).unwrap();

        assert_eq!(
            reopened.get_by_email(&EmailAddress::from_str("a@x.com").unwrap()),
            Ok(user)
        );
    }

    #[test]
    fn get_fails_for_unknown_user() {
        let dir = tempdir().unwrap();
        let store =
            JsonUserStore::open(dir.path().join("users.json"), CorruptionPolicy::Fail).unwrap();

        assert_eq!(store.get(UserID::new(1)), Err(Error::NotFound));
        assert_eq!(
            store.get_by_email(&EmailAddress::from_str("nobody@x.com").unwrap()),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn recovered_store_restarts_ids_and_reports_recovery() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");
        let mut store = JsonUserStore::open(&path, CorruptionPolicy::Fail).unwrap();
        store.create(new_user("a@x.com")).unwrap();
        store.create(new_user("b@x.com")).unwrap();
        drop(store);
        std::fs::write(&path, "[{\"id\": 2, \"firstN").unwrap();

        let mut store = JsonUserStore::open(&path, CorruptionPolicy::TreatAsEmpty).unwrap();

        assert_eq!(store.was_recovered(), Ok(true));
        let user = store.create(new_user("c@x.com")).unwrap();
        assert_eq!(user.id, UserID::new(1));

        drop(store);
        let reopened = JsonUserStore::open(&path, CorruptionPolicy::Fail).unwrap();
        assert_eq!(reopened.was_recovered(), Ok(false));
    }
}
