//! This file defines the type `Transaction`, the core type of the ledger, and
//! the validated `Amount` it carries.

use std::{fmt::Display, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::{Error, models::UserID};

/// Alias for the integer type used for transaction IDs.
pub type TransactionID = i64;

/// Whether a transaction adds money to or takes money from the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money paid in, adds to the balance.
    Deposit,
    /// Money taken out, subtracts from the balance.
    Withdrawal,
}

impl TransactionKind {
    /// The lowercase name used on the wire and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    /// Only the exact literals `deposit` and `withdrawal` are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(TransactionKind::Deposit),
            "withdrawal" => Ok(TransactionKind::Withdrawal),
            _ => Err(Error::InvalidTransactionKind(s.to_owned())),
        }
    }
}

/// A strictly positive amount of money, in the same unspecified currency
/// throughout the ledger.
///
/// Amounts are exact decimals, so sums never drift the way binary floating
/// point does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// The largest amount a single transaction may carry.
    ///
    /// Keeping individual amounts well below [Decimal::MAX] means the balance
    /// of even a very long ledger stays representable.
    pub const MAX: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

    /// Create an amount from a decimal.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidAmount] if `value` is zero, negative or larger than [Amount::MAX].
    pub fn new(value: Decimal) -> Result<Self, Error> {
        if value <= Decimal::ZERO || value > Self::MAX {
            return Err(Error::InvalidAmount(value.to_string()));
        }

        Ok(Self(value))
    }

    /// Parse an amount from a JSON value, which may be a number or a numeric string.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidAmount] for anything that is not a positive number,
    /// including `null`, booleans and non-numeric strings.
    pub fn from_json(value: &Value) -> Result<Self, Error> {
        match value {
            // serde_json prints numbers the way they were written, e.g. "100.0" or "1e3".
            Value::Number(number) => number.to_string().parse(),
            Value::String(text) => text.parse(),
            other => Err(Error::InvalidAmount(other.to_string())),
        }
    }

    /// The amount as a decimal.
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Amount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // Decimal::from_str skips `_`, so digit separators are caught here.
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E'))
        {
            return Err(Error::InvalidAmount(s.to_owned()));
        }

        let value = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| Error::InvalidAmount(s.to_owned()))?;

        Self::new(value)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = Error;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A deposit or withdrawal recorded in the ledger.
///
/// Transactions are append-only: once stored they are never modified or
/// removed. The JSON field names match what the web client already speaks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionID,
    /// The user that recorded this transaction.
    pub user_id: UserID,
    /// How much money moved.
    pub amount: Amount,
    /// Which way the money moved.
    #[serde(rename = "transactionType")]
    pub kind: TransactionKind,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction was recorded.
    #[serde(rename = "date", with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl Transaction {
    /// The effect of this transaction on the balance: positive for deposits
    /// and negative for withdrawals.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Deposit => self.amount.value(),
            TransactionKind::Withdrawal => -self.amount.value(),
        }
    }
}

/// A validated transaction that has not been stored yet.
///
/// Use [NewTransaction::new] to create one, the store assigns the ID and,
/// unless [NewTransaction::timestamp] was set, the timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub(crate) user_id: UserID,
    pub(crate) amount: Amount,
    pub(crate) kind: TransactionKind,
    pub(crate) description: String,
    pub(crate) timestamp: Option<OffsetDateTime>,
}

impl NewTransaction {
    /// Create a new transaction for `user_id`.
    ///
    /// The description is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyDescription] if the description is empty or only whitespace.
    pub fn new(
        user_id: UserID,
        amount: Amount,
        kind: TransactionKind,
        description: &str,
    ) -> Result<Self, Error> {
        let description = description.trim();

        if description.is_empty() {
            return Err(Error::EmptyDescription);
        }

        Ok(Self {
            user_id,
            amount,
            kind,
            description: description.to_owned(),
            timestamp: None,
        })
    }

    /// Record the transaction with an explicit timestamp instead of the current time.
    pub fn timestamp(mut self, timestamp: OffsetDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// The user the transaction belongs to.
    pub fn user_id(&self) -> UserID {
        self.user_id
    }

    /// Attach the store-assigned `id` and `timestamp`.
    pub(crate) fn into_transaction(
        self,
        id: TransactionID,
        timestamp: OffsetDateTime,
    ) -> Transaction {
        Transaction {
            id,
            user_id: self.user_id,
            amount: self.amount,
            kind: self.kind,
            description: self.description,
            timestamp,
        }
    }
}


#[cfg(test)]
mod transaction_tests {
    use rust_decimal::Decimal;
    use time::macros::datetime;

    use crate::{
        Error,
        models::{Amount, NewTransaction, TransactionKind, UserID},
    };

    #[test]
    fn kind_accepts_only_exact_literals() {
        assert_eq!(
            "deposit".parse::<TransactionKind>(),
            Ok(TransactionKind::Deposit)
        );
        assert_eq!(
            "withdrawal".parse::<TransactionKind>(),
            Ok(TransactionKind::Withdrawal)
        );

        for raw in ["Deposit", "withdraw", "", "transfer"] {
            assert_eq!(
                raw.parse::<TransactionKind>(),
                Err(Error::InvalidTransactionKind(raw.to_owned()))
            );
        }
    }

    #[test]
    fn new_transaction_rejects_blank_description() {
        let amount = Amount::new(Decimal::ONE).unwrap();

        let result = NewTransaction::new(UserID::new(1), amount, TransactionKind::Deposit, "  ");

        assert_eq!(result, Err(Error::EmptyDescription));
    }

    #[test]
    fn signed_amount_is_negative_for_withdrawals() {
        let amount = Amount::new(Decimal::new(4000, 2)).unwrap();
        let timestamp = datetime!(2025-01-01 00:00 UTC);

        let deposit = NewTransaction::new(UserID::new(1), amount, TransactionKind::Deposit, "pay")
            .unwrap()
            .into_transaction(1, timestamp);
        let withdrawal =
            NewTransaction::new(UserID::new(1), amount, TransactionKind::Withdrawal, "rent")
                .unwrap()
                .into_transaction(2, timestamp);

        assert_eq!(deposit.signed_amount(), Decimal::new(4000, 2));
        assert_eq!(withdrawal.signed_amount(), Decimal::new(-4000, 2));
    }

    #[test]
    fn serializes_with_client_field_names() {
        let amount = Amount::new(Decimal::new(10000, 2)).unwrap();
        let transaction =
            NewTransaction::new(UserID::new(7), amount, TransactionKind::Deposit, "Salary")
                .unwrap()
                .into_transaction(3, datetime!(2025-03-04 05:06:07 UTC));

        let json = serde_json::to_string(&transaction).unwrap();

        assert_eq!(
            json,
            r#"{"id":3,"userId":7,"amount":100.00,"transactionType":"deposit","description":"Salary","date":"2025-03-04T05:06:07Z"}"#
        );
    }
}
