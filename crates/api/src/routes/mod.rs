//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (database ping)
//!
//! # Auth
//! POST /api/auth/register               - Register, returns a bearer token
//! POST /api/auth/login                  - Login, returns a bearer token
//!
//! # Catalog
//! GET    /api/categories                - Category listing
//! GET    /api/categories/{id}           - Category with its products
//! POST   /api/categories                - Create category (admin)
//! PUT    /api/categories/{id}           - Update category (admin)
//! DELETE /api/categories/{id}           - Delete category (admin)
//! GET    /api/products                  - Product listing
//! GET    /api/products/{id}             - Product detail
//!
//! # Cart (requires auth)
//! GET    /api/cart                      - Current cart (lazily created)
//! POST   /api/cart/items                - Add product / increment line
//! DELETE /api/cart/items/{product_id}   - Remove line
//!
//! # Wishlist (requires auth)
//! GET    /api/wishlist                  - Current wishlist (lazily created)
//! POST   /api/wishlist/items            - Add product (idempotent)
//! DELETE /api/wishlist/items/{product_id} - Remove entry
//!
//! # Orders (requires auth)
//! POST /api/orders                      - Checkout: convert cart to order
//! GET  /api/orders                      - Own orders; all orders for admins
//! GET  /api/orders/{id}                 - Order detail (owner or admin)
//! PUT  /api/orders/{id}/status          - Change status (admin)
//!
//! # Reviews
//! POST   /api/reviews                   - Create or overwrite own review
//! DELETE /api/reviews/{id}              - Delete review (author or admin)
//! GET    /api/reviews/product/{id}      - Product's reviews
//! GET    /api/reviews/product/{id}/average - Average rating + count
//! ```

pub mod auth;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod wishlist;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::list).post(categories::create))
        .route(
            "/{id}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::remove),
        )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/items", post(cart::add_item))
        .route("/items/{product_id}", delete(cart::remove_item))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/items", post(wishlist::add_item))
        .route("/items/{product_id}", delete(wishlist::remove_item))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list).post(orders::checkout))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", put(orders::update_status))
}

/// Create the review routes router.
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(reviews::submit))
        .route("/{id}", delete(reviews::remove))
        .route("/product/{id}", get(reviews::list_for_product))
        .route("/product/{id}/average", get(reviews::average_for_product))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .nest("/auth", auth_routes())
        .nest("/categories", category_routes())
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .nest("/orders", order_routes())
        .nest("/reviews", review_routes());

    Router::new().nest("/api", api)
}
