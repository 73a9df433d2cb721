//! Defines the endpoint for registering a new user.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    auth::cookie::set_token_cookie,
    models::{
        Gender, NewUser, PasswordHash, UserProfile, parse_date_of_birth, parse_email,
        required_field,
    },
    stores::{TransactionStore, UserStore},
};

/// The data for registering a user.
///
/// Every field is optional here so that a missing field is reported by name
/// instead of as a generic parse error.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    /// The user's given name.
    pub first_name: Option<String>,
    /// The user's family name.
    pub sur_name: Option<String>,
    /// The date of birth as `YYYY-MM-DD`.
    pub date_of_birth: Option<String>,
    /// One of `male`, `female` or `other`.
    pub gender: Option<String>,
    /// The email to log in with.
    pub email_id: Option<String>,
    /// The password to log in with.
    pub password: Option<String>,
}

impl RegisterForm {
    /// Validate the form and hash the password with `password_cost`.
    fn into_new_user(self, password_cost: u32) -> Result<NewUser, Error> {
        let first_name = required_field(self.first_name, "firstName")?;
        let surname = required_field(self.sur_name, "surName")?;
        let date_of_birth =
            parse_date_of_birth(&required_field(self.date_of_birth, "dateOfBirth")?)?;
        let gender = required_field(self.gender, "gender")?.parse::<Gender>()?;
        let email = parse_email(&required_field(self.email_id, "emailId")?)?;
        let password = self.password.ok_or(Error::MissingField("password"))?;
        let password_hash = PasswordHash::from_raw_password(&password, password_cost)?;

        Ok(NewUser {
            first_name,
            surname,
            date_of_birth,
            gender,
            email,
            password_hash,
        })
    }
}

/// A route handler for creating a new user.
///
/// On success the user is logged in straight away: the response carries a
/// session token in the body and in the token cookie.
///
/// # Errors
///
/// Returns a validation error (400) for missing or malformed fields and
/// [Error::DuplicateEmail] (409) if the email is taken.
pub async fn register<U, T>(
    State(mut state): State<AppState<U, T>>,
    jar: CookieJar,
    payload: Result<Json<RegisterForm>, JsonRejection>,
) -> Result<(StatusCode, CookieJar, Json<Value>), Error>
where
    U: UserStore + Clone + Send + Sync + 'static,
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    let Json(form) = payload?;
    let new_user = form.into_new_user(state.auth.password_cost())?;

    let user = state.user_store.create(new_user).inspect_err(|error| {
        if *error == Error::DuplicateEmail {
            tracing::debug!("Registration rejected, the email is already in use");
        }
    })?;
    let token = state.auth.issue(&user)?;
    tracing::info!("Registered user {}", user.id);

    let jar = set_token_cookie(jar, &token, state.auth.token_duration());

    Ok((
        StatusCode::CREATED,
        jar,
        Json(json!({
            "message": "User Registered Successfully!",
            "token": token,
            "user": UserProfile::from(&user),
        })),
    ))
}
