//! Integration tests for Clementine.
//!
//! # Running Tests
//!
//! ```bash
//! # Apply migrations and reconcile the admin account
//! cargo run -p clementine-cli -- migrate
//! cargo run -p clementine-cli -- bootstrap
//!
//! # Start the API
//! cargo run -p clementine-api
//!
//! # Run integration tests
//! cargo test -p clementine-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `CLEMENTINE_API_BASE_URL` - API base URL (default: `http://localhost:3000`)
//! - `CLEMENTINE_DATABASE_URL` (fallback `DATABASE_URL`) - Used for test
//!   fixtures the API offers no endpoint for (catalog rows, role changes)
//!
//! The tests live in `tests/` and are `#[ignore]`d because they need a
//! running server and database.
