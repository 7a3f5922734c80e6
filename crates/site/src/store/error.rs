//! Backend error types.

use thiserror::Error;

/// Errors from the hosted data store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// A uniqueness constraint rejected the write.
    #[error("Duplicate key: {0}")]
    Conflict(String),

    /// No row matched.
    #[error("Record not found")]
    NotFound,

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from the hosted identity provider.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong email or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account already exists for this email.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Form failed a required-field or confirmation check.
    #[error("{0}")]
    Validation(String),

    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned an unexpected error response.
    #[error("auth provider error: {status} - {message}")]
    Provider { status: u16, message: String },

    /// Writing the profile row failed after sign-up.
    #[error("profile error: {0}")]
    Store(#[from] StoreError),
}
