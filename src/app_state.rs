//! Implements a struct that holds the state of the REST server.

use axum::extract::FromRef;

use crate::{
    auth::AuthState,
    balance::Ledger,
    config::AuthConfig,
    stores::{TransactionStore, UserStore},
};

/// The state of the REST server.
///
/// The state is generic over the user store `U` and the transaction store
/// `T`, so the same router serves either storage backend.
#[derive(Clone)]
pub struct AppState<U, T> {
    /// The state for issuing and checking session tokens.
    pub auth: AuthState,
    /// The store for users.
    pub user_store: U,
    /// The balance engine over the transaction store.
    pub ledger: Ledger<T>,
}

impl<U, T> AppState<U, T>
where
    U: UserStore,
    T: TransactionStore,
{
    /// Create a new [AppState] from the auth settings and the two stores.
    pub fn new(auth_config: AuthConfig, user_store: U, transaction_store: T) -> Self {
        Self {
            auth: AuthState::new(auth_config),
            user_store,
            ledger: Ledger::new(transaction_store),
        }
    }
}

impl<U, T> FromRef<AppState<U, T>> for AuthState {
    fn from_ref(state: &AppState<U, T>) -> Self {
        state.auth.clone()
    }
}

impl<U, T> FromRef<AppState<U, T>> for Ledger<T>
where
    T: Clone,
{
    fn from_ref(state: &AppState<U, T>) -> Self {
        state.ledger.clone()
    }
}
