//! The API endpoints URIs.

/// The route for creating a new user account.
pub const REGISTER: &str = "/auth/register";
/// The route for exchanging credentials for a token.
pub const LOG_IN: &str = "/auth/login";
/// The route for revoking the current token.
pub const LOG_OUT: &str = "/auth/logout";
/// The route for reading the logged-in user's profile.
pub const PROFILE: &str = "/user/profile";
/// The route for recording a deposit or withdrawal.
pub const TRANSACTION: &str = "/transactions/transaction";
/// The route for reading the logged-in user's balance.
pub const BALANCE: &str = "/transactions/balance";
/// The route for listing the logged-in user's transactions.
pub const TRANSACTIONS: &str = "/transactions/transactions";

#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::REGISTER);
        assert_endpoint_is_valid_uri(endpoints::LOG_IN);
        assert_endpoint_is_valid_uri(endpoints::LOG_OUT);
        assert_endpoint_is_valid_uri(endpoints::PROFILE);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTION);
        assert_endpoint_is_valid_uri(endpoints::BALANCE);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS);
    }

    #[test]
    fn endpoints_are_distinct() {
        let mut all = vec![
            endpoints::REGISTER,
            endpoints::LOG_IN,
            endpoints::LOG_OUT,
            endpoints::PROFILE,
            endpoints::TRANSACTION,
            endpoints::BALANCE,
            endpoints::TRANSACTIONS,
        ];
        let count = all.len();
        all.sort_unstable();
        all.dedup();

        assert_eq!(all.len(), count);
    }
}
