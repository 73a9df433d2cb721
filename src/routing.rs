//! Application router configuration.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;

use crate::{
    AppState,
    auth::{get_profile, log_in, log_out, register},
    balance::get_balance_endpoint,
    endpoints,
    logging::logging_middleware,
    stores::{TransactionStore, UserStore},
    transaction::{create_transaction_endpoint, list_transactions_endpoint},
};

/// Return a router with all the app's routes.
///
/// The auth routes are open to anyone. The user and transaction routes
/// require a session token, which their handlers check through
/// [AuthenticatedUser](crate::auth::AuthenticatedUser).
pub fn build_router<U, T>(state: AppState<U, T>) -> Router
where
    U: UserStore + Clone + Send + Sync + 'static,
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    let auth_routes = Router::new()
        .route(endpoints::REGISTER, post(register::<U, T>))
        .route(endpoints::LOG_IN, post(log_in::<U, T>))
        .route(endpoints::LOG_OUT, post(log_out));

    let protected_routes = Router::new()
        .route(endpoints::PROFILE, get(get_profile::<U, T>))
        .route(
            endpoints::TRANSACTION,
            post(create_transaction_endpoint::<T>),
        )
        .route(endpoints::BALANCE, get(get_balance_endpoint::<T>))
        .route(endpoints::TRANSACTIONS, get(list_transactions_endpoint::<T>));

    protected_routes
        .merge(auth_routes)
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Route not found" })),
    )
        .into_response()
}
