//! The endpoints for recording transactions and reading the transaction history.

mod create_endpoint;
mod list_endpoint;

pub use create_endpoint::create_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;
