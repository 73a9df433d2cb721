//! Implements a SQLite backed user store.
use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use email_address::EmailAddress;
use rusqlite::{Connection, Row, types::Type};
use time::Date;

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{Gender, NewUser, PasswordHash, User, UserID},
    stores::UserStore,
};

/// Handles the creation and retrieval of User objects.
#[derive(Debug, Clone)]
pub struct SQLiteUserStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteUserStore {
    /// Create a new user store.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl UserStore for SQLiteUserStore {
    /// Create and insert a new user into the database.
    ///
    /// # Errors
    ///
    /// Returns a [Error::DuplicateEmail] if the email is taken, ignoring case,
    /// or [Error::SqlError] if some other SQL related error occurred.
    fn create(&mut self, new_user: NewUser) -> Result<User, Error> {
        let connection = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        connection.execute(
            "INSERT INTO user (first_name, surname, date_of_birth, gender, email, password)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (
                &new_user.first_name,
                &new_user.surname,
                new_user.date_of_birth.to_string(),
                new_user.gender.as_str(),
                new_user.email.as_str(),
                new_user.password_hash.as_str(),
            ),
        )?;

        let id = UserID::new(connection.last_insert_rowid());

        Ok(new_user.into_user(id))
    }

    /// Get the user from the database that has the specified `id`.
    ///
    /// # Errors
    ///
    /// Returns a [Error::NotFound] error if there is no user with the specified ID or [Error::SqlError] if there are SQL related errors.
    fn get(&self, id: UserID) -> Result<User, Error> {
        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .prepare(
                "SELECT id, first_name, surname, date_of_birth, gender, email, password
                 FROM user WHERE id = :id",
            )?
            .query_row(&[(":id", &id.as_i64())], SQLiteUserStore::map_row)
            .map_err(|e| e.into())
    }

    /// Get the user from the database that has the specified `email` address, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns a [Error::NotFound] error if there is no user with the specified email or [Error::SqlError] there are SQL related errors.
    fn get_by_email(&self, email: &EmailAddress) -> Result<User, Error> {
        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .prepare(
                "SELECT id, first_name, surname, date_of_birth, gender, email, password
                 FROM user WHERE email = :email",
            )?
            .query_row(&[(":email", email.as_str())], SQLiteUserStore::map_row)
            .map_err(|e| e.into())
    }
}

impl CreateTable for SQLiteUserStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS user (
                    id INTEGER PRIMARY KEY,
                    first_name TEXT NOT NULL,
                    surname TEXT NOT NULL,
                    date_of_birth TEXT NOT NULL,
                    gender TEXT NOT NULL,
                    email TEXT UNIQUE NOT NULL COLLATE NOCASE,
                    password TEXT NOT NULL
                    )",
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

impl MapRow for SQLiteUserStore {
    type ReturnType = User;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let raw_id = row.get(offset)?;
        let first_name = row.get(offset + 1)?;
        let surname = row.get(offset + 2)?;
        let raw_date_of_birth: String = row.get(offset + 3)?;
        let raw_gender: String = row.get(offset + 4)?;
        let raw_email: String = row.get(offset + 5)?;
        let raw_password_hash: String = row.get(offset + 6)?;

        let date_of_birth = Date::parse(
            &raw_date_of_birth,
            time::macros::format_description!("[year]-[month]-[day]"),
        )
        .map_err(|error| conversion_error(offset + 3, error))?;
        let gender =
            Gender::from_str(&raw_gender).map_err(|error| conversion_error(offset + 4, error))?;

        Ok(User {
            id: UserID::new(raw_id),
            first_name,
            surname,
            date_of_birth,
            gender,
            email: EmailAddress::new_unchecked(raw_email),
            password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        })
    }
}

#[cfg(test)]
mod user_tests {
    use std::{
        str::FromStr,
        sync::{Arc, Mutex},
    };

    use email_address::EmailAddress;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        db::CreateTable,
        models::{Gender, NewUser, PasswordHash, UserID},
    };

    use super::{SQLiteUserStore, UserStore};

    fn get_store() -> SQLiteUserStore {
        let conn = Connection::open_in_memory().unwrap();
        SQLiteUserStore::create_table(&conn).unwrap();

        SQLiteUserStore::new(Arc::new(Mutex::new(conn)))
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            first_name: "Ada".to_owned(),
            surname: "Lovelace".to_owned(),
            date_of_birth: date!(1990 - 01 - 01),
            gender: Gender::Female,
            email: EmailAddress::from_str(email).unwrap(),
            password_hash: PasswordHash::new_unchecked("hunter2"),
        }
    }

    #[test]
    fn insert_user_succeeds() {
        let mut store = get_store();
        let want = new_user("hello@world.com");

        let inserted_user = store.create(want.clone()).unwrap();

        assert!(inserted_user.id.as_i64() > 0);
        assert_eq!(inserted_user.email, want.email);
        assert_eq!(inserted_user.password_hash, want.password_hash);
        assert_eq!(inserted_user.date_of_birth, want.date_of_birth);
    }

    #[test]
    fn insert_user_fails_on_duplicate_email() {
        let mut store = get_store();

        assert!(store.create(new_user("hello@world.com")).is_ok());

        assert_eq!(
            store.create(new_user("hello@world.com")),
            Err(Error::DuplicateEmail)
        );
    }

    #[test]
    fn insert_user_fails_on_duplicate_email_with_different_case() {
        let mut store = get_store();

        assert!(store.create(new_user("hello@world.com")).is_ok());

        assert_eq!(
            store.create(new_user("Hello@World.com")),
            Err(Error::DuplicateEmail)
        );
    }

    #[test]
    fn get_user_fails_with_non_existent_id() {
        let store = get_store();

        assert_eq!(store.get(UserID::new(42)), Err(Error::NotFound));
    }

    #[test]
    fn get_user_succeeds_with_existing_id() {
        let mut store = get_store();
        let test_user = store.create(new_user("foo@bar.baz")).unwrap();

        let retrieved_user = store.get(test_user.id).unwrap();

        assert_eq!(retrieved_user, test_user);
    }

    #[test]
    fn get_user_by_email_ignores_case() {
        let mut store = get_store();
        let test_user = store.create(new_user("foo@bar.baz")).unwrap();

        let retrieved_user = store
            .get_by_email(&EmailAddress::from_str("FOO@bar.baz").unwrap())
            .unwrap();

        assert_eq!(retrieved_user, test_user);
    }

    #[test]
    fn get_user_fails_with_non_existent_email() {
        let store = get_store();

        let email = EmailAddress::from_str("notavalidemail@foo.bar").unwrap();

        assert_eq!(store.get_by_email(&email), Err(Error::NotFound));
    }
}
