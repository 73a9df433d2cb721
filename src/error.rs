//! Defines the app level error type and its conversion to JSON error responses.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use time::Date;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request body was not valid JSON for the endpoint.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// A required field was missing or blank in the request.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The amount was not a number, was zero or negative, or was too large.
    #[error("\"{0}\" is not a valid amount, amounts must be positive numbers")]
    InvalidAmount(String),

    /// The transaction type was not one of the recognised kinds.
    #[error("\"{0}\" is not a valid transaction type, expected \"deposit\" or \"withdrawal\"")]
    InvalidTransactionKind(String),

    /// A transaction was given an empty description.
    #[error("the description cannot be empty")]
    EmptyDescription,

    /// The password is longer than the hashing algorithm can use.
    #[error("passwords cannot be longer than {0} bytes")]
    PasswordTooLong(usize),

    /// A date string could not be parsed.
    #[error("\"{0}\" is not a valid date, expected YYYY-MM-DD")]
    InvalidDate(String),

    /// A date in the future was used where only past dates make sense, e.g.
    /// a date of birth.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// The email address could not be parsed.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// The gender was not one of the recognised values.
    #[error("\"{0}\" is not a valid gender, expected \"male\", \"female\" or \"other\"")]
    InvalidGender(String),

    /// A transaction was given a timestamp earlier than the newest
    /// transaction in the store.
    #[error("transaction timestamps must not be earlier than the latest transaction")]
    TimestampOutOfOrder,

    /// The email used to create the user is already in use. The client should try again with a
    /// different email address.
    #[error("a user with this email already exists")]
    DuplicateEmail,

    /// The email/password combination did not match a registered user.
    ///
    /// Unknown emails and wrong passwords both produce this error so that
    /// clients cannot tell which accounts exist.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The request did not carry a session token.
    #[error("unauthorized")]
    MissingToken,

    /// The session token was malformed, tampered with, expired or revoked.
    #[error("invalid token")]
    InvalidToken,

    /// The requested resource was not found.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Summing the ledger overflowed the decimal range.
    #[error("the balance is too large to represent")]
    BalanceOverflow,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Reading or writing a store file failed.
    #[error("an I/O error occurred: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted collection could not be parsed.
    #[error("the store at {0} is corrupt")]
    CorruptStore(String),

    /// An error occurred while serializing a record as JSON.
    #[error("could not serialize as JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Could not acquire a lock on shared state.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A session token could not be signed.
    #[error("could not create a token: {0}")]
    TokenCreation(String),
}

/// The broad category of an [Error], which decides how it is reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input. The request should not be retried as is.
    Validation,
    /// A unique key is already taken.
    Conflict,
    /// Missing or invalid credentials or session token.
    Auth,
    /// The resource does not exist.
    NotFound,
    /// The persistence medium or a server-side primitive failed.
    Storage,
}

impl Error {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidBody(_)
            | Error::MissingField(_)
            | Error::InvalidAmount(_)
            | Error::InvalidTransactionKind(_)
            | Error::EmptyDescription
            | Error::PasswordTooLong(_)
            | Error::InvalidDate(_)
            | Error::FutureDate(_)
            | Error::InvalidEmail(_)
            | Error::InvalidGender(_)
            | Error::TimestampOutOfOrder => ErrorKind::Validation,
            Error::DuplicateEmail => ErrorKind::Conflict,
            Error::InvalidCredentials | Error::MissingToken | Error::InvalidToken => {
                ErrorKind::Auth
            }
            Error::NotFound => ErrorKind::NotFound,
            Error::BalanceOverflow
            | Error::SqlError(_)
            | Error::Io(_)
            | Error::CorruptStore(_)
            | Error::Serialization(_)
            | Error::DatabaseLockError
            | Error::HashingError(_)
            | Error::TokenCreation(_) => ErrorKind::Storage,
        }
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Error::MissingField(a), Error::MissingField(b)) => a == b,
            (Error::InvalidBody(a), Error::InvalidBody(b))
            | (Error::InvalidAmount(a), Error::InvalidAmount(b))
            | (Error::InvalidTransactionKind(a), Error::InvalidTransactionKind(b))
            | (Error::InvalidDate(a), Error::InvalidDate(b))
            | (Error::InvalidEmail(a), Error::InvalidEmail(b))
            | (Error::InvalidGender(a), Error::InvalidGender(b))
            | (Error::CorruptStore(a), Error::CorruptStore(b))
            | (Error::HashingError(a), Error::HashingError(b))
            | (Error::TokenCreation(a), Error::TokenCreation(b)) => a == b,
            (Error::FutureDate(a), Error::FutureDate(b)) => a == b,
            (Error::PasswordTooLong(a), Error::PasswordTooLong(b)) => a == b,
            (Error::SqlError(a), Error::SqlError(b)) => a == b,
            (Error::Io(a), Error::Io(b)) => a.kind() == b.kind(),
            (Error::Serialization(a), Error::Serialization(b)) => a.to_string() == b.to_string(),
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self.kind() {
            ErrorKind::Validation => (StatusCode::BAD_REQUEST, self.to_string()),
            ErrorKind::Conflict => (StatusCode::CONFLICT, self.to_string()),
            ErrorKind::Auth => (StatusCode::UNAUTHORIZED, self.to_string()),
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            // Storage errors are not intended to be shown to the client.
            ErrorKind::Storage => {
                tracing::error!("An unexpected error occurred: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_owned(),
                )
            }
        };

        let body = Json(json!({
            "message": message,
        }));

        (status, body).into_response()
    }
}
