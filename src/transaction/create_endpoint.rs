//! Defines the endpoint for recording a deposit or withdrawal.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    Error,
    auth::AuthenticatedUser,
    balance::Ledger,
    models::{Amount, NewTransaction, TransactionKind, UserID},
    stores::TransactionStore,
};

/// The form data for recording a transaction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionForm {
    /// A positive amount, as a JSON number or a numeric string.
    pub amount: Option<Value>,
    /// Either `deposit` or `withdrawal`.
    pub transaction_type: Option<String>,
    /// Text detailing the transaction.
    pub description: Option<String>,
}

impl TransactionForm {
    fn into_new_transaction(self, user_id: UserID) -> Result<NewTransaction, Error> {
        let amount = match self.amount {
            None | Some(Value::Null) => return Err(Error::MissingField("amount")),
            Some(value) => Amount::from_json(&value)?,
        };
        let kind = self
            .transaction_type
            .ok_or(Error::MissingField("transactionType"))?
            .parse::<TransactionKind>()?;
        let description = self
            .description
            .ok_or(Error::MissingField("description"))?;

        NewTransaction::new(user_id, amount, kind, &description)
    }
}

/// A route handler for recording a transaction for the logged-in user.
///
/// Responds with the stored transaction and the user's balance after it.
///
/// # Errors
///
/// Returns a validation error (400) for a missing, non-numeric or
/// non-positive amount, an unknown transaction type, or a blank description.
pub async fn create_transaction_endpoint<T>(
    State(mut ledger): State<Ledger<T>>,
    user: AuthenticatedUser,
    payload: Result<Json<TransactionForm>, JsonRejection>,
) -> Result<Json<Value>, Error>
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    let Json(form) = payload?;
    let new_transaction = form.into_new_transaction(user.user_id)?;

    let (transaction, balance) = ledger.record_and_recompute(new_transaction)?;

    Ok(Json(json!({
        "message": "Transaction successful!",
        "transaction": transaction,
        "balance": balance,
    })))
}
