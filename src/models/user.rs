//! This file defines a user of the application and its supporting types.

use std::{fmt::Display, str::FromStr};

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, macros::format_description};

use crate::{Error, models::PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash, PartialOrd, Ord)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The genders a user can pick from when registering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// The lowercase name used on the wire and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(Error::InvalidGender(s.to_owned())),
        }
    }
}

/// A user of the application.
///
/// Users are created on registration and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the store.
    pub id: UserID,
    /// The user's given name.
    pub first_name: String,
    /// The user's family name.
    pub surname: String,
    /// The user's date of birth, never later than the day they registered.
    #[serde(with = "super::iso_date")]
    pub date_of_birth: Date,
    /// The gender the user picked when registering.
    pub gender: Gender,
    /// The user's email, unique across all users regardless of case.
    pub email: EmailAddress,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

/// The validated details for a user that has not been stored yet.
///
/// See [User] for the meaning of each field.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub struct NewUser {
    pub first_name: String,
    pub surname: String,
    pub date_of_birth: Date,
    pub gender: Gender,
    pub email: EmailAddress,
    pub password_hash: PasswordHash,
}

impl NewUser {
    /// Attach the store-assigned `id`.
    pub fn into_user(self, id: UserID) -> User {
        User {
            id,
            first_name: self.first_name,
            surname: self.surname,
            date_of_birth: self.date_of_birth,
            gender: self.gender,
            email: self.email,
            password_hash: self.password_hash,
        }
    }
}

/// The public view of a [User], safe to send to clients.
///
/// Field names match the JSON the web client already speaks, e.g. `surName`
/// and `emailId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct UserProfile {
    pub id: UserID,
    pub first_name: String,
    pub sur_name: String,
    #[serde(with = "super::iso_date")]
    pub date_of_birth: Date,
    pub gender: Gender,
    pub email_id: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            sur_name: user.surname.clone(),
            date_of_birth: user.date_of_birth,
            gender: user.gender,
            email_id: user.email.to_string(),
        }
    }
}

/// Parse a trimmed, non-empty text field named `field`.
///
/// # Errors
///
/// Returns [Error::MissingField] if `value` is absent or blank.
pub(crate) fn required_field(value: Option<String>, field: &'static str) -> Result<String, Error> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_owned()),
        _ => Err(Error::MissingField(field)),
    }
}

/// Parse an email address.
///
/// # Errors
///
/// Returns [Error::InvalidEmail] if `raw_email` is not a valid address.
pub(crate) fn parse_email(raw_email: &str) -> Result<EmailAddress, Error> {
    EmailAddress::from_str(raw_email.trim()).map_err(|_| Error::InvalidEmail(raw_email.to_owned()))
}

/// Parse a date of birth in the format `YYYY-MM-DD`.
///
/// # Errors
///
/// Returns [Error::InvalidDate] if the string is not a date, or
/// [Error::FutureDate] if it is later than today (UTC).
pub(crate) fn parse_date_of_birth(raw_date: &str) -> Result<Date, Error> {
    let date = Date::parse(raw_date.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| Error::InvalidDate(raw_date.to_owned()))?;

    if date > OffsetDateTime::now_utc().date() {
        return Err(Error::FutureDate(date));
    }

    Ok(date)
}

#[cfg(test)]
mod tests {
    use time::{Duration, OffsetDateTime, macros::date};

    use crate::Error;

    use super::{Gender, UserID, UserProfile, parse_date_of_birth, parse_email, required_field};

    #[test]
    fn profile_date_of_birth_round_trips_as_iso_date() {
        let profile = UserProfile {
            id: UserID::new(1),
            first_name: "Ada".to_owned(),
            sur_name: "Lovelace".to_owned(),
            date_of_birth: date!(1990 - 01 - 01),
            gender: Gender::Female,
            email_id: "a@x.com".to_owned(),
        };

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["dateOfBirth"], "1990-01-01");

        let parsed: UserProfile = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, profile);
    }

    #[test]
    fn gender_parses_known_values_case_insensitively() {
        assert_eq!("male".parse::<Gender>(), Ok(Gender::Male));
        assert_eq!("Female".parse::<Gender>(), Ok(Gender::Female));
        assert_eq!(" OTHER ".parse::<Gender>(), Ok(Gender::Other));
    }

    #[test]
    fn gender_rejects_unknown_values() {
        assert_eq!(
            "robot".parse::<Gender>(),
            Err(Error::InvalidGender("robot".to_owned()))
        );
    }

    #[test]
    fn required_field_trims_and_rejects_blank() {
        assert_eq!(
            required_field(Some("  Ada ".to_owned()), "firstName"),
            Ok("Ada".to_owned())
        );
        assert_eq!(
            required_field(Some("   ".to_owned()), "firstName"),
            Err(Error::MissingField("firstName"))
        );
        assert_eq!(
            required_field(None, "surName"),
            Err(Error::MissingField("surName"))
        );
    }

    #[test]
    fn parse_email_rejects_garbage() {
        assert!(parse_email("a@x.com").is_ok());
        assert_eq!(
            parse_email("not an email"),
            Err(Error::InvalidEmail("not an email".to_owned()))
        );
    }

    #[test]
    fn parse_date_of_birth_accepts_iso_dates() {
        assert_eq!(parse_date_of_birth("1990-02-28"), Ok(date!(1990 - 02 - 28)));
    }

    #[test]
    fn parse_date_of_birth_rejects_malformed_dates() {
        assert_eq!(
            parse_date_of_birth("28/02/1990"),
            Err(Error::InvalidDate("28/02/1990".to_owned()))
        );
        assert_eq!(
            parse_date_of_birth("1990-02-30"),
            Err(Error::InvalidDate("1990-02-30".to_owned()))
        );
    }

    #[test]
    fn parse_date_of_birth_rejects_future_dates() {
        let tomorrow = OffsetDateTime::now_utc().date() + Duration::days(1);
        let raw = tomorrow.to_string();

        assert_eq!(parse_date_of_birth(&raw), Err(Error::FutureDate(tomorrow)));
    }
}
