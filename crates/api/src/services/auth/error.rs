//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] clementine_core::EmailError),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// No user matches the email.
    ///
    /// Deliberately distinct from `InvalidCredentials`: the login flow
    /// reveals whether an email is registered. Known information-disclosure
    /// tradeoff, preserved as-is.
    #[error("user not found")]
    UserNotFound,

    /// Wrong password for an existing user.
    #[error("invalid password")]
    InvalidCredentials,

    /// The account is locked after too many failed attempts.
    #[error("account locked out")]
    LockedOut,

    /// The account is administratively disabled.
    #[error("account disabled")]
    AccountDisabled,

    /// The account mandates a second factor; no token is issued.
    #[error("two-factor authentication required")]
    TwoFactorRequired,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
