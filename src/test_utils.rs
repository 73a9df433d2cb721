//! Helpers shared by the route handler tests.

#![allow(missing_docs)]

use std::path::Path;

use axum_test::TestServer;
use email_address::EmailAddress;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use time::macros::date;

use crate::{
    AppState, build_router,
    config::{AuthConfig, CorruptionPolicy},
    endpoints,
    models::{Gender, PasswordHash, User, UserID},
    stores::{SQLiteTransactionStore, SQLiteUserStore, open_json_stores, open_sqlite_stores},
};

/// The secret tests sign tokens with.
pub(crate) const TEST_SECRET: &str = "foobar";

/// bcrypt's minimum cost, to keep the tests fast.
const TEST_PASSWORD_COST: u32 = 4;

pub(crate) fn test_auth_config() -> AuthConfig {
    AuthConfig::new(TEST_SECRET).with_password_cost(TEST_PASSWORD_COST)
}

pub(crate) fn test_user() -> User {
    User {
        id: UserID::new(1),
        first_name: "Ada".to_owned(),
        surname: "Lovelace".to_owned(),
        date_of_birth: date!(1990 - 01 - 01),
        gender: Gender::Female,
        email: "test@test.com".parse::<EmailAddress>().unwrap(),
        password_hash: PasswordHash::new_unchecked("hunter2"),
    }
}

/// App state over an in-memory SQLite database.
pub(crate) fn get_test_state() -> AppState<SQLiteUserStore, SQLiteTransactionStore> {
    let conn = Connection::open_in_memory().unwrap();
    let (user_store, transaction_store) = open_sqlite_stores(conn).unwrap();

    AppState::new(test_auth_config(), user_store, transaction_store)
}

/// A test server backed by an in-memory SQLite database.
pub(crate) fn get_test_server() -> TestServer {
    TestServer::try_new(build_router(get_test_state())).expect("Could not create test server.")
}

/// A test server backed by JSON files in `data_dir`.
pub(crate) fn get_json_test_server(data_dir: &Path) -> TestServer {
    let (user_store, transaction_store) =
        open_json_stores(data_dir, CorruptionPolicy::Fail).unwrap();
    let state = AppState::new(test_auth_config(), user_store, transaction_store);

    TestServer::try_new(build_router(state)).expect("Could not create test server.")
}

/// A valid registration body for `email` and `password`.
pub(crate) fn registration(email: &str, password: &str) -> Value {
    json!({
        "firstName": "Ada",
        "surName": "Lovelace",
        "dateOfBirth": "1990-01-01",
        "gender": "female",
        "emailId": email,
        "password": password,
    })
}

/// Register a user and return their session token.
pub(crate) async fn register_user(server: &TestServer, email: &str, password: &str) -> String {
    let response = server
        .post(endpoints::REGISTER)
        .json(&registration(email, password))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    response.json::<Value>()["token"]
        .as_str()
        .expect("register response should contain a token")
        .to_owned()
}

/// Record a transaction for the token's user, asserting that it succeeds.
pub(crate) async fn record(
    server: &TestServer,
    token: &str,
    amount: &str,
    kind: &str,
    description: &str,
) {
    server
        .post(endpoints::TRANSACTION)
        .authorization_bearer(token)
        .json(&json!({
            "amount": amount,
            "transactionType": kind,
            "description": description,
        }))
        .await
        .assert_status_ok();
}

/// Get the balance of the token's user.
pub(crate) async fn balance_of(server: &TestServer, token: &str) -> Decimal {
    let response = server
        .get(endpoints::BALANCE)
        .authorization_bearer(token)
        .await;
    response.assert_status_ok();

    let balance = response.json::<Value>()["balance"].clone();
    assert!(balance.is_number(), "balance should be a JSON number");

    // Numbers keep their exact text, so this parses without going through f64.
    balance
        .to_string()
        .parse()
        .expect("balance should parse as a decimal")
}
