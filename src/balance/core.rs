//! Derives a user's balance from their transactions.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use rust_decimal::Decimal;

use crate::{
    Error,
    models::{NewTransaction, Transaction, UserID},
    stores::TransactionStore,
};

/// Sum the signed amounts of the transactions owned by `user_id`.
///
/// Deposits count positively and withdrawals negatively. Transactions of
/// other users are ignored and an empty slice sums to zero.
///
/// # Errors
/// Returns [Error::BalanceOverflow] if the sum does not fit in a [Decimal].
pub fn compute_balance(user_id: UserID, transactions: &[Transaction]) -> Result<Decimal, Error> {
    transactions
        .iter()
        .filter(|transaction| transaction.user_id == user_id)
        .try_fold(Decimal::ZERO, |balance, transaction| {
            balance
                .checked_add(transaction.signed_amount())
                .ok_or(Error::BalanceOverflow)
        })
}

/// One mutex per user, handed out on demand.
///
/// Holding a user's mutex serializes writes for that user without blocking
/// writes for anyone else.
#[derive(Debug, Clone, Default)]
struct UserLocks(Arc<Mutex<HashMap<UserID, Arc<Mutex<()>>>>>);

impl UserLocks {
    fn for_user(&self, user_id: UserID) -> Result<Arc<Mutex<()>>, Error> {
        let mut locks = self.0.lock().map_err(|_| Error::DatabaseLockError)?;

        Ok(locks.entry(user_id).or_default().clone())
    }
}

/// The balance engine: records transactions and reports balances computed
/// from the ledger.
///
/// The balance is never stored, every read recomputes it from the store.
#[derive(Debug, Clone)]
pub struct Ledger<T> {
    store: T,
    locks: UserLocks,
}

impl<T> Ledger<T>
where
    T: TransactionStore,
{
    /// Create a ledger on top of `store`.
    pub fn new(store: T) -> Self {
        Self {
            store,
            locks: UserLocks::default(),
        }
    }

    /// The current balance of `user_id`, zero if they have no transactions.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or the sum overflows.
    pub fn get_balance(&self, user_id: UserID) -> Result<Decimal, Error> {
        let transactions = self.store.list_by_user(user_id)?;

        compute_balance(user_id, &transactions)
    }

    /// The transaction history of `user_id` in the order it was recorded.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub fn list_transactions(&self, user_id: UserID) -> Result<Vec<Transaction>, Error> {
        self.store.list_by_user(user_id)
    }

    /// Store `transaction` and return it along with the owner's new balance.
    ///
    /// The write and the recomputation happen while holding the owner's lock,
    /// so the balance reflects exactly this write and the writes before it.
    ///
    /// # Errors
    /// Returns an error if the store rejects the write, cannot be read, or if
    /// the user's lock is poisoned.
    pub fn record_and_recompute(
        &mut self,
        transaction: NewTransaction,
    ) -> Result<(Transaction, Decimal), Error> {
        let user_id = transaction.user_id();
        let lock = self.locks.for_user(user_id)?;
        let _guard = lock.lock().map_err(|_| Error::DatabaseLockError)?;

        let transaction = self.store.append(transaction)?;
        let balance = self.get_balance(user_id)?;

        tracing::debug!(
            "Recorded {} of {} for user {user_id}, balance is now {balance}",
            transaction.kind.as_str(),
            transaction.amount
        );

        Ok((transaction, balance))
    }
}
