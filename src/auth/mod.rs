//! Registration, log-in and session tokens.
//!
//! Session tokens are JWTs signed with the configured secret. They travel in
//! the `Authorization: Bearer` header or, for browsers, in the token cookie.

mod cookie;
mod extractor;
mod log_in;
mod log_out;
mod profile;
mod register;
mod revocation;
mod state;
mod token;

pub use extractor::AuthenticatedUser;
pub use log_in::log_in;
pub use log_out::log_out;
pub use profile::get_profile;
pub use register::register;
pub use revocation::RevocationList;
pub use state::AuthState;
pub use token::Claims;
