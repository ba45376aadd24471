//! Shared helpers for the API integration tests.
//!
//! The API has no endpoints for catalog seeding or role management, so
//! fixtures go straight to the database.

#![allow(dead_code)]

use reqwest::Client;
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

/// Password that satisfies the registration policy.
pub const PASSWORD: &str = "Sturdy-Passw0rd";

/// Base URL for the API (configurable via environment).
pub fn base_url() -> String {
    std::env::var("CLEMENTINE_API_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned())
}

/// Plain HTTP client.
pub fn client() -> Client {
    Client::new()
}

/// A unique email per test run so tests never collide.
pub fn unique_email() -> String {
    format!("test-{}@example.com", Uuid::new_v4())
}

/// Connect to the database for fixtures the API offers no endpoint for.
pub async fn db_pool() -> PgPool {
    let url = std::env::var("CLEMENTINE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("CLEMENTINE_DATABASE_URL must be set for integration tests");
    PgPool::connect(&url)
        .await
        .expect("Failed to connect to database")
}

/// Register a fresh user; returns (token, `user_id`).
pub async fn register(client: &Client, email: &str) -> (String, i32) {
    let resp = client
        .post(format!("{}/api/auth/register", base_url()))
        .json(&json!({
            "email": email,
            "password": PASSWORD,
            "first_name": "Test",
            "last_name": "Shopper",
        }))
        .send()
        .await
        .expect("Failed to register");

    assert_eq!(resp.status(), reqwest::StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to read register response");
    let token = body["token"].as_str().expect("token missing").to_owned();
    let user_id = i32::try_from(body["user"]["id"].as_i64().expect("user id missing"))
        .expect("user id out of range");
    (token, user_id)
}

/// Login; returns the fresh token.
pub async fn login(client: &Client, email: &str) -> String {
    let resp = client
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({ "email": email, "password": PASSWORD }))
        .send()
        .await
        .expect("Failed to login");

    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to read login response");
    body["token"].as_str().expect("token missing").to_owned()
}

/// Seed a category with one product at the given price; returns the
/// product ID.
pub async fn seed_product(pool: &PgPool, price: &str) -> i32 {
    let category_id: i32 = sqlx::query_scalar(
        "INSERT INTO shop.category (name, description) VALUES ($1, '') RETURNING id",
    )
    .bind(format!("test-category-{}", Uuid::new_v4()))
    .fetch_one(pool)
    .await
    .expect("Failed to seed category");

    sqlx::query_scalar(
        "INSERT INTO shop.product (category_id, name, description, price, image_url)
         VALUES ($1, $2, '', $3::numeric, '') RETURNING id",
    )
    .bind(category_id)
    .bind(format!("test-product-{}", Uuid::new_v4()))
    .bind(price)
    .fetch_one(pool)
    .await
    .expect("Failed to seed product")
}

/// Grant the Admin role directly in the store. Tokens issued before this
/// call do not pick it up until re-login.
pub async fn grant_admin(pool: &PgPool, user_id: i32) {
    sqlx::query(
        "INSERT INTO shop.user_role (user_id, role_id)
         SELECT $1, id FROM shop.role WHERE name = 'Admin'
         ON CONFLICT (user_id, role_id) DO NOTHING",
    )
    .bind(user_id)
    .execute(pool)
    .await
    .expect("Failed to grant admin role");
}

/// Revoke the Admin role directly in the store.
pub async fn revoke_admin(pool: &PgPool, user_id: i32) {
    sqlx::query(
        "DELETE FROM shop.user_role
         WHERE user_id = $1
           AND role_id = (SELECT id FROM shop.role WHERE name = 'Admin')",
    )
    .bind(user_id)
    .execute(pool)
    .await
    .expect("Failed to revoke admin role");
}
