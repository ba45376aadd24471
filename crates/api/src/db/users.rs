//! User repository for database operations.
//!
//! Covers accounts, password credential rows (including lockout
//! bookkeeping), and role assignments.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use clementine_core::{Email, Role, UserId};

use super::{RepositoryError, map_unique_violation};
use crate::models::user::{LoginRecord, User};

/// Row shape shared by the user queries.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    first_name: String,
    last_name: String,
    disabled: bool,
    two_factor_enabled: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(User {
            id: UserId::new(self.id),
            email,
            first_name: self.first_name,
            last_name: self.last_name,
            disabled: self.disabled,
            two_factor_enabled: self.two_factor_enabled,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct LoginRow {
    id: i32,
    email: String,
    first_name: String,
    last_name: String,
    disabled: bool,
    two_factor_enabled: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    password_hash: String,
    failed_logins: i32,
    locked_until: Option<DateTime<Utc>>,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the email in the database is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, email, first_name, last_name, disabled, two_factor_enabled,
                   created_at, updated_at
            FROM shop.users
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Create a new user with a password credential and the default role,
    /// all in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_password(
        &self,
        email: &Email,
        password_hash: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO shop.users (email, first_name, last_name)
            VALUES ($1, $2, $3)
            RETURNING id, email, first_name, last_name, disabled, two_factor_enabled,
                      created_at, updated_at
            ",
        )
        .bind(email.as_str())
        .bind(first_name)
        .bind(last_name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "email already exists"))?;

        let user = row.into_user()?;

        sqlx::query(
            r"
            INSERT INTO shop.user_password (user_id, password_hash)
            VALUES ($1, $2)
            ",
        )
        .bind(user.id.as_i32())
        .bind(password_hash)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
            INSERT INTO shop.user_role (user_id, role_id)
            SELECT $1, id FROM shop.role WHERE name = $2
            ",
        )
        .bind(user.id.as_i32())
        .bind(Role::DEFAULT.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(user)
    }

    /// Get a user joined with their credential row for a login attempt.
    ///
    /// Returns `None` if no user matches the email or the user has no
    /// password set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the email in the database is invalid.
    pub async fn get_login_record(
        &self,
        email: &Email,
    ) -> Result<Option<LoginRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, LoginRow>(
            r"
            SELECT u.id, u.email, u.first_name, u.last_name, u.disabled,
                   u.two_factor_enabled, u.created_at, u.updated_at,
                   p.password_hash, p.failed_logins, p.locked_until
            FROM shop.users u
            JOIN shop.user_password p ON u.id = p.user_id
            WHERE u.email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        let user = UserRow {
            id: r.id,
            email: r.email,
            first_name: r.first_name,
            last_name: r.last_name,
            disabled: r.disabled,
            two_factor_enabled: r.two_factor_enabled,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
        .into_user()?;

        Ok(Some(LoginRecord {
            user,
            password_hash: r.password_hash,
            failed_logins: r.failed_logins,
            locked_until: r.locked_until,
        }))
    }

    /// Get all roles currently assigned to a user.
    ///
    /// Unknown role names in the database are reported as corruption rather
    /// than silently dropped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` on an unknown role name.
    pub async fn get_roles(&self, user_id: UserId) -> Result<Vec<Role>, RepositoryError> {
        let names = sqlx::query_scalar::<_, String>(
            r"
            SELECT r.name
            FROM shop.role r
            JOIN shop.user_role ur ON r.id = ur.role_id
            WHERE ur.user_id = $1
            ORDER BY r.name
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        names
            .iter()
            .map(|name| {
                name.parse::<Role>().map_err(|_| {
                    RepositoryError::DataCorruption(format!("unknown role in database: {name}"))
                })
            })
            .collect()
    }

    /// Record a failed login attempt, locking the account once the failure
    /// threshold is reached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no credential row.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn record_failed_login(
        &self,
        user_id: UserId,
        threshold: i32,
        lockout_minutes: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.user_password
            SET failed_logins = failed_logins + 1,
                locked_until = CASE
                    WHEN failed_logins + 1 >= $2
                    THEN now() + make_interval(mins => $3)
                    ELSE locked_until
                END
            WHERE user_id = $1
            ",
        )
        .bind(user_id.as_i32())
        .bind(threshold)
        .bind(lockout_minutes)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Reset the failure counter and clear any lockout after a successful
    /// login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no credential row.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn clear_failed_logins(&self, user_id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.user_password
            SET failed_logins = 0, locked_until = NULL
            WHERE user_id = $1
            ",
        )
        .bind(user_id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
