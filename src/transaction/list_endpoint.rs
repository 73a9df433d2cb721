//! Defines the endpoint for the logged-in user's transaction history.

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::{Error, auth::AuthenticatedUser, balance::Ledger, stores::TransactionStore};

/// A route handler that lists the transactions of the logged-in user, oldest first.
pub async fn list_transactions_endpoint<T>(
    State(ledger): State<Ledger<T>>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, Error>
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    let transactions = ledger.list_transactions(user.user_id)?;

    Ok(Json(json!({ "transactions": transactions })))
}

#[cfg(test)]
mod list_transactions_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        endpoints,
        test_utils::{get_test_server, record, register_user},
    };

    #[tokio::test]
    async fn lists_only_own_transactions_in_order() {
        let server = get_test_server();
        let alice = register_user(&server, "a@x.com", "secret1").await;
        let bob = register_user(&server, "b@x.com", "secret2").await;
        record(&server, &alice, "10", "deposit", "first").await;
        record(&server, &bob, "99", "deposit", "not yours").await;
        record(&server, &alice, "3", "withdrawal", "second").await;

        let response = server
            .get(endpoints::TRANSACTIONS)
            .authorization_bearer(&alice)
            .await;

        response.assert_status_ok();
        let transactions = response.json::<Value>()["transactions"].clone();
        let descriptions: Vec<_> = transactions
            .as_array()
            .unwrap()
            .iter()
            .map(|transaction| transaction["description"].as_str().unwrap().to_owned())
            .collect();
        assert_eq!(descriptions, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn empty_history_is_an_empty_list() {
        let server = get_test_server();
        let token = register_user(&server, "a@x.com", "secret1").await;

        let response = server
            .get(endpoints::TRANSACTIONS)
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({ "transactions": [] }));
    }

    #[tokio::test]
    async fn listing_requires_token() {
        let server = get_test_server();

        server
            .get(endpoints::TRANSACTIONS)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
