//! User domain types.

use chrono::{DateTime, Utc};

use clementine_core::{Email, UserId};

/// A registered user (domain type).
///
/// The password credential lives in a separate table and never travels with
/// this type; see [`LoginRecord`] for the login path.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address, doubling as the login handle.
    pub email: Email,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Administratively disabled accounts cannot log in.
    pub disabled: bool,
    /// Whether login requires a second factor.
    pub two_factor_enabled: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Display name embedded in issued tokens.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A user joined with their credential row, fetched for a login attempt.
#[derive(Debug, Clone)]
pub struct LoginRecord {
    /// The user being authenticated.
    pub user: User,
    /// Argon2 PHC-format password hash.
    pub password_hash: String,
    /// Consecutive failed login attempts since the last success.
    pub failed_logins: i32,
    /// The account is locked out until this instant, if set.
    pub locked_until: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_joins_names() {
        let user = User {
            id: UserId::new(1),
            email: Email::parse("jo@example.com").expect("valid email"),
            first_name: "Jo".to_owned(),
            last_name: "Bloggs".to_owned(),
            disabled: false,
            two_factor_enabled: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(user.display_name(), "Jo Bloggs");
    }
}
