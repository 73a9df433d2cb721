//! Defines the endpoint for reading the logged-in user's balance.

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::{Error, auth::AuthenticatedUser, balance::Ledger, stores::TransactionStore};

/// A route handler that returns the balance of the logged-in user.
///
/// The balance is a decimal string, `"0"` for a user with no transactions.
pub async fn get_balance_endpoint<T>(
    State(ledger): State<Ledger<T>>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, Error>
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    let balance = ledger.get_balance(user.user_id)?;

    Ok(Json(json!({ "balance": balance })))
}
