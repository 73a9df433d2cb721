//! Runtime configuration shared by the server binary and the library.

use clap::ValueEnum;
use jsonwebtoken::{DecodingKey, EncodingKey};
use time::Duration;

use crate::models::PasswordHash;

/// How long a session token stays valid after it is issued.
pub const DEFAULT_TOKEN_DURATION: Duration = Duration::hours(24);

/// The persistence medium backing users and transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    /// A single SQLite database file.
    Sqlite,
    /// A directory holding one JSON file per collection.
    Json,
}

/// What a file-backed store should do when its file cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum CorruptionPolicy {
    /// Refuse to open the store and report [Error::CorruptStore](crate::Error::CorruptStore).
    #[default]
    Fail,
    /// Move the corrupt file aside and start with an empty collection.
    ///
    /// User IDs start from 1 again afterwards. Rotate the JWT secret so that
    /// old tokens cannot act as the users who receive those IDs.
    TreatAsEmpty,
}

#[derive(Clone)]
struct JwtKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

/// Settings for issuing and checking session tokens and hashing passwords.
#[derive(Clone)]
pub struct AuthConfig {
    jwt_keys: JwtKeys,
    /// How long a token is valid for after it is issued.
    pub token_duration: Duration,
    /// The bcrypt cost used when hashing new passwords.
    pub password_cost: u32,
}

impl AuthConfig {
    /// Create a config that signs tokens with `jwt_secret`, using the default
    /// token duration and hashing cost.
    pub fn new(jwt_secret: &str) -> Self {
        Self {
            jwt_keys: JwtKeys {
                encoding_key: EncodingKey::from_secret(jwt_secret.as_ref()),
                decoding_key: DecodingKey::from_secret(jwt_secret.as_ref()),
            },
            token_duration: DEFAULT_TOKEN_DURATION,
            password_cost: PasswordHash::DEFAULT_COST,
        }
    }

    /// Set how long issued tokens remain valid.
    pub fn with_token_duration(mut self, token_duration: Duration) -> Self {
        self.token_duration = token_duration;
        self
    }

    /// Set the bcrypt cost. Lower values are only suitable for tests.
    pub fn with_password_cost(mut self, password_cost: u32) -> Self {
        self.password_cost = password_cost;
        self
    }

    /// The encoding key for JWTs.
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.jwt_keys.encoding_key
    }

    /// The decoding key for JWTs.
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.jwt_keys.decoding_key
    }
}
