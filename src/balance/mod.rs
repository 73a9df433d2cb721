mod core;
mod endpoint;

pub use core::{Ledger, compute_balance};
pub use endpoint::get_balance_endpoint;
