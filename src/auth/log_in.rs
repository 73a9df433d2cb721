//! Defines the endpoint for logging in with an email and password.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    auth::cookie::set_token_cookie,
    models::{UserProfile, parse_email, required_field},
    stores::{TransactionStore, UserStore},
};

/// The credentials entered during log-in.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogInForm {
    /// Email entered during log-in.
    pub email_id: Option<String>,
    /// Password entered during log-in.
    pub password: Option<String>,
}

/// A route handler for logging in.
///
/// Each successful log-in issues a new token, earlier tokens stay valid
/// until they expire or are logged out.
///
/// # Errors
///
/// Returns [Error::MissingField] if either field is absent and
/// [Error::InvalidCredentials] if the email does not belong to a registered
/// user or the password is not correct.
pub async fn log_in<U, T>(
    State(state): State<AppState<U, T>>,
    jar: CookieJar,
    payload: Result<Json<LogInForm>, JsonRejection>,
) -> Result<(CookieJar, Json<Value>), Error>
where
    U: UserStore + Clone + Send + Sync + 'static,
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    let Json(form) = payload?;
    let raw_email = required_field(form.email_id, "emailId")?;
    let password = form.password.ok_or(Error::MissingField("password"))?;

    // A malformed email cannot belong to anyone, treat it like an unknown one.
    let user = match parse_email(&raw_email) {
        Ok(email) => match state.user_store.get_by_email(&email) {
            Ok(user) => Some(user),
            Err(Error::NotFound) => None,
            Err(error) => return Err(error),
        },
        Err(_) => None,
    };

    // Unknown emails are checked against a decoy hash so they take as long
    // as a wrong password.
    if !state.auth.check_password(user.as_ref(), &password)? {
        tracing::debug!("Failed log-in attempt for {raw_email}");
        return Err(Error::InvalidCredentials);
    }

    let user = user.ok_or(Error::InvalidCredentials)?;

    let token = state.auth.issue(&user)?;
    let jar = set_token_cookie(jar, &token, state.auth.token_duration());

    Ok((
        jar,
        Json(json!({
            "message": "Login Successful!",
            "token": token,
            "user": UserProfile::from(&user),
        })),
    ))
}

#[cfg(test)]
mod log_in_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use axum_test::TestServer;

    use crate::{
        build_router, endpoints,
        test_utils::{get_test_server, get_test_state, register_user},
    };

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let server = get_test_server();
        let register_token = register_user(&server, "a@x.com", "secret1").await;

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({ "emailId": "a@x.com", "password": "secret1" }))
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["message"], "Login Successful!");
        assert_eq!(body["user"]["emailId"], "a@x.com");
        let token = body["token"].as_str().unwrap();
        assert_ne!(token, register_token);
    }

    #[tokio::test]
    async fn log_in_ignores_email_case() {
        let server = get_test_server();
        register_user(&server, "a@x.com", "secret1").await;

        server
            .post(endpoints::LOG_IN)
            .json(&json!({ "emailId": "A@X.COM", "password": "secret1" }))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_get_the_same_error() {
        let server = get_test_server();
        register_user(&server, "a@x.com", "secret1").await;

        let wrong_password = server
            .post(endpoints::LOG_IN)
            .json(&json!({ "emailId": "a@x.com", "password": "wrong" }))
            .await;
        let unknown_email = server
            .post(endpoints::LOG_IN)
            .json(&json!({ "emailId": "b@x.com", "password": "secret1" }))
            .await;

        wrong_password.assert_status(StatusCode::UNAUTHORIZED);
        unknown_email.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(
            wrong_password.json::<Value>(),
            json!({ "message": "invalid email or password" })
        );
        assert_eq!(wrong_password.json::<Value>(), unknown_email.json::<Value>());
    }

    #[tokio::test]
    async fn log_in_fails_with_missing_credentials() {
        let server = get_test_server();

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({ "emailId": "a@x.com" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "message": "password is required" }));
    }

    #[tokio::test]
    async fn unknown_email_is_checked_against_decoy_hash() {
        let state = get_test_state();
        let server =
            TestServer::try_new(build_router(state.clone())).expect("Could not create test server.");
        assert!(!state.auth.has_decoy_hash());

        server
            .post(endpoints::LOG_IN)
            .json(&json!({ "emailId": "nobody@x.com", "password": "secret1" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        assert!(state.auth.has_decoy_hash());
    }

    #[tokio::test]
    async fn malformed_email_is_checked_against_decoy_hash() {
        let state = get_test_state();
        let server =
            TestServer::try_new(build_router(state.clone())).expect("Could not create test server.");

        server
            .post(endpoints::LOG_IN)
            .json(&json!({ "emailId": "not an email", "password": "secret1" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        assert!(state.auth.has_decoy_hash());
    }
}
