//! Authentication service.
//!
//! Orchestrates registration and login over the user repository. Passwords
//! are hashed with Argon2id; lockout bookkeeping lives with the credential
//! row and is surfaced here as typed errors.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use sqlx::PgPool;

use clementine_core::{Email, Role};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::{LoginRecord, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Failed attempts before the account locks.
const LOCKOUT_THRESHOLD: i32 = 5;

/// How long a lockout lasts, in minutes.
const LOCKOUT_MINUTES: i32 = 15;

/// Authentication service.
///
/// Handles user registration and login. Successful calls return the user
/// together with their currently assigned roles so the caller can issue a
/// token immediately.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user with email and password.
    ///
    /// The user, their password credential, and the default role assignment
    /// are persisted in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<(User, Vec<Role>), AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create_with_password(&email, &password_hash, first_name, last_name)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        // A fresh registration holds exactly the default role.
        Ok((user, vec![Role::DEFAULT]))
    }

    /// Login with email and password.
    ///
    /// Checks run in order: unknown email, lockout, disabled account,
    /// password, second factor. A wrong password increments the failure
    /// counter and locks the account once the threshold is crossed; a
    /// correct one resets the counter.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no user matches the email.
    /// Returns `AuthError::LockedOut` if the account is locked.
    /// Returns `AuthError::AccountDisabled` if the account is disabled.
    /// Returns `AuthError::InvalidCredentials` on a wrong password.
    /// Returns `AuthError::TwoFactorRequired` if the account mandates a
    /// second factor; no token should be issued.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, Vec<Role>), AuthError> {
        let email = Email::parse(email)?;

        let LoginRecord {
            user,
            password_hash,
            locked_until,
            ..
        } = self
            .users
            .get_login_record(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if let Some(locked_until) = locked_until
            && locked_until > Utc::now()
        {
            return Err(AuthError::LockedOut);
        }

        if user.disabled {
            return Err(AuthError::AccountDisabled);
        }

        if verify_password(password, &password_hash).is_err() {
            tracing::warn!(user_id = %user.id, "failed login attempt");
            self.users
                .record_failed_login(user.id, LOCKOUT_THRESHOLD, LOCKOUT_MINUTES)
                .await?;
            return Err(AuthError::InvalidCredentials);
        }

        self.users.clear_failed_logins(user.id).await?;

        if user.two_factor_enabled {
            return Err(AuthError::TwoFactorRequired);
        }

        let roles = self.users.get_roles(user.id).await?;

        Ok((user, roles))
    }
}

/// Validate password meets requirements: minimum length plus at least one
/// uppercase letter, one lowercase letter, and one digit.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    if !password.chars().any(char::is_uppercase) {
        return Err(AuthError::WeakPassword(
            "password must contain an uppercase letter".to_owned(),
        ));
    }

    if !password.chars().any(char::is_lowercase) {
        return Err(AuthError::WeakPassword(
            "password must contain a lowercase letter".to_owned(),
        ));
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AuthError::WeakPassword(
            "password must contain a digit".to_owned(),
        ));
    }

    Ok(())
}

/// Hash a password using Argon2id.
pub(crate) fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_too_short() {
        let err = validate_password("Ab1").unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword(msg)
            if msg.contains("at least 8 characters")));
    }

    #[test]
    fn test_password_missing_uppercase() {
        let err = validate_password("lowercase1").unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword(msg)
            if msg.contains("uppercase")));
    }

    #[test]
    fn test_password_missing_lowercase() {
        let err = validate_password("UPPERCASE1").unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword(msg)
            if msg.contains("lowercase")));
    }

    #[test]
    fn test_password_missing_digit() {
        let err = validate_password("NoDigitsHere").unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword(msg)
            if msg.contains("digit")));
    }

    #[test]
    fn test_password_compliant() {
        assert!(validate_password("Sturdy-Passw0rd").is_ok());
    }

    #[test]
    fn test_hash_verify_roundtrip() {
        let hash = hash_password("Sturdy-Passw0rd").unwrap();
        assert!(verify_password("Sturdy-Passw0rd", &hash).is_ok());
        assert!(verify_password("Wrong-Passw0rd", &hash).is_err());
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("Sturdy-Passw0rd").unwrap();
        let second = hash_password("Sturdy-Passw0rd").unwrap();
        assert_ne!(first, second);
    }
}
