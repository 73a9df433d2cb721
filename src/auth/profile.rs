//! Defines the endpoint for reading the logged-in user's profile.

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    auth::AuthenticatedUser,
    models::UserProfile,
    stores::{TransactionStore, UserStore},
};

/// A route handler that returns the profile of the user making the request.
///
/// # Errors
///
/// Returns an auth error for a missing or invalid token and
/// [Error::NotFound] if the token refers to a user that does not exist.
pub async fn get_profile<U, T>(
    State(state): State<AppState<U, T>>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, Error>
where
    U: UserStore + Clone + Send + Sync + 'static,
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    let user = state.user_store.get(user.user_id)?;

    Ok(Json(json!({ "user": UserProfile::from(&user) })))
}

#[cfg(test)]
mod profile_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        auth::cookie::COOKIE_TOKEN,
        endpoints,
        test_utils::{get_test_server, register_user, registration},
    };

    #[tokio::test]
    async fn get_profile_returns_public_fields() {
        let server = get_test_server();
        let token = register_user(&server, "a@x.com", "secret1").await;

        let response = server
            .get(endpoints::PROFILE)
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();
        let user = &response.json::<Value>()["user"];
        assert_eq!(user["emailId"], "a@x.com");
        assert_eq!(user["surName"], "Lovelace");
        assert_eq!(user["gender"], "female");
        assert!(user.get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn get_profile_requires_token() {
        let server = get_test_server();

        server
            .get(endpoints::PROFILE)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn profile_accepts_token_cookie_from_register() {
        let server = get_test_server();
        let cookie = server
            .post(endpoints::REGISTER)
            .json(&registration("a@x.com", "secret1"))
            .await
            .cookie(COOKIE_TOKEN);

        let response = server.get(endpoints::PROFILE).add_cookie(cookie).await;

        response.assert_status_ok();
        response.assert_json_contains(&json!({ "user": { "emailId": "a@x.com" } }));
    }
}
