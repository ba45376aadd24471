//! Admin account reconciliation.
//!
//! Converges the database to the configured admin state: the "Admin" and
//! "User" roles exist, the configured admin account exists with the
//! configured password, is enabled and unlocked, and holds the Admin role.
//! Safe to re-run; every step is an upsert or a drift check. This runs as a
//! deployment-time task, not at server startup.
//!
//! # Environment Variables
//!
//! - `CLEMENTINE_DATABASE_URL` (fallback `DATABASE_URL`) - `PostgreSQL` connection string
//! - `CLEMENTINE_ADMIN_EMAIL` - Admin account email
//! - `CLEMENTINE_ADMIN_PASSWORD` - Admin account password

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use thiserror::Error;

use clementine_core::{Email, Role};

/// Errors that can occur during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Invalid admin email.
    #[error("Invalid admin email: {0}")]
    InvalidEmail(#[from] clementine_core::EmailError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing error.
    #[error("Password hashing error")]
    PasswordHash,
}

/// Reconcile the admin account to its configured state.
///
/// # Errors
///
/// Returns `BootstrapError` if configuration is missing or a database
/// operation fails.
pub async fn run() -> Result<(), BootstrapError> {
    dotenvy::dotenv().ok();

    let database_url = super::migrate::database_url().ok_or(BootstrapError::MissingEnvVar(
        "CLEMENTINE_DATABASE_URL",
    ))?;
    let email = Email::parse(
        &std::env::var("CLEMENTINE_ADMIN_EMAIL")
            .map_err(|_| BootstrapError::MissingEnvVar("CLEMENTINE_ADMIN_EMAIL"))?,
    )?;
    let password = SecretString::from(
        std::env::var("CLEMENTINE_ADMIN_PASSWORD")
            .map_err(|_| BootstrapError::MissingEnvVar("CLEMENTINE_ADMIN_PASSWORD"))?,
    );

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    ensure_roles(&pool).await?;
    let user_id = ensure_admin_user(&pool, &email).await?;
    ensure_password(&pool, user_id, &password).await?;
    ensure_admin_role(&pool, user_id).await?;

    tracing::info!(%user_id, "Admin account reconciled");
    Ok(())
}

/// Ensure the static role rows exist.
async fn ensure_roles(pool: &PgPool) -> Result<(), BootstrapError> {
    for role in Role::ALL {
        sqlx::query(
            r"
            INSERT INTO shop.role (name)
            VALUES ($1)
            ON CONFLICT (name) DO NOTHING
            ",
        )
        .bind(role.as_str())
        .execute(pool)
        .await?;
    }
    Ok(())
}

/// Ensure the admin user row exists and is enabled; returns its ID.
async fn ensure_admin_user(pool: &PgPool, email: &Email) -> Result<i32, BootstrapError> {
    let existing = sqlx::query_scalar::<_, i32>(
        r"
        SELECT id FROM shop.users WHERE email = $1
        ",
    )
    .bind(email.as_str())
    .fetch_optional(pool)
    .await?;

    if let Some(id) = existing {
        // Repair drift: a disabled admin account locks everyone out.
        sqlx::query(
            r"
            UPDATE shop.users SET disabled = FALSE, updated_at = now()
            WHERE id = $1 AND disabled
            ",
        )
        .bind(id)
        .execute(pool)
        .await?;
        return Ok(id);
    }

    tracing::info!(email = %email, "Creating admin user");
    let id = sqlx::query_scalar::<_, i32>(
        r"
        INSERT INTO shop.users (email, first_name, last_name)
        VALUES ($1, 'Store', 'Admin')
        RETURNING id
        ",
    )
    .bind(email.as_str())
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Ensure the credential row holds the configured password, resetting it
/// (and any lockout) when drifted.
async fn ensure_password(
    pool: &PgPool,
    user_id: i32,
    password: &SecretString,
) -> Result<(), BootstrapError> {
    let current_hash = sqlx::query_scalar::<_, String>(
        r"
        SELECT password_hash FROM shop.user_password WHERE user_id = $1
        ",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    if let Some(hash) = &current_hash
        && password_matches(password.expose_secret(), hash)
    {
        return Ok(());
    }

    if current_hash.is_some() {
        tracing::info!("Admin password drifted, resetting");
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map_err(|_| BootstrapError::PasswordHash)?
        .to_string();

    sqlx::query(
        r"
        INSERT INTO shop.user_password (user_id, password_hash, failed_logins, locked_until)
        VALUES ($1, $2, 0, NULL)
        ON CONFLICT (user_id)
        DO UPDATE SET password_hash = EXCLUDED.password_hash,
                      failed_logins = 0,
                      locked_until = NULL
        ",
    )
    .bind(user_id)
    .bind(hash)
    .execute(pool)
    .await?;

    Ok(())
}

/// Ensure the user holds the Admin role.
async fn ensure_admin_role(pool: &PgPool, user_id: i32) -> Result<(), BootstrapError> {
    sqlx::query(
        r"
        INSERT INTO shop.user_role (user_id, role_id)
        SELECT $1, id FROM shop.role WHERE name = $2
        ON CONFLICT (user_id, role_id) DO NOTHING
        ",
    )
    .bind(user_id)
    .bind(Role::Admin.as_str())
    .execute(pool)
    .await?;

    Ok(())
}

fn password_matches(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}
