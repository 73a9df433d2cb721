//! This module defines the domain data types.

use time::Date;

pub use password::{MAX_PASSWORD_BYTES, PasswordHash, ValidatedPassword};
pub use transaction::{Amount, NewTransaction, Transaction, TransactionID, TransactionKind};
pub use user::{Gender, NewUser, User, UserID, UserProfile};
pub(crate) use user::{parse_date_of_birth, parse_email, required_field};

mod password;
mod transaction;
mod user;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");
