//! Cart route handlers.
//!
//! The cart is lazily created, so `GET /api/cart` never 404s. Adding a
//! product that is already in the cart increments the existing line instead
//! of creating a second one.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use clementine_core::ProductId;

use crate::db::{CartRepository, CatalogRepository};
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::cart::Cart;
use crate::state::AppState;

/// Cart shape returned to the client.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub id: i32,
    pub lines: Vec<CartLinePayload>,
    pub item_count: i64,
    pub total_price: Decimal,
}

/// A single cart line with its product joined in.
#[derive(Debug, Serialize)]
pub struct CartLinePayload {
    pub id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub unit_price: Decimal,
    pub image_url: String,
    pub quantity: i32,
    pub line_total: Decimal,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        let item_count = cart.item_count();
        let total_price = cart.total_price();
        Self {
            id: cart.id.as_i32(),
            lines: cart
                .lines
                .into_iter()
                .map(|l| CartLinePayload {
                    id: l.id.as_i32(),
                    product_id: l.product_id.as_i32(),
                    line_total: l.line_total(),
                    product_name: l.product_name,
                    unit_price: l.product_price,
                    image_url: l.product_image_url,
                    quantity: l.quantity,
                })
                .collect(),
            item_count,
            total_price,
        }
    }
}

/// Add-item request body.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: i32,
    pub quantity: i32,
}

/// Add-item result: the affected line and its quantity after the add.
#[derive(Debug, Serialize)]
pub struct AddItemResponse {
    pub line_id: i32,
    pub product_id: i32,
    pub quantity: i32,
}

/// GET /api/cart
pub async fn show(user: CurrentUser, State(state): State<AppState>) -> Result<Json<CartResponse>> {
    let cart = CartRepository::new(state.pool())
        .get_or_create(user.user_id)
        .await?;

    Ok(Json(CartResponse::from(cart)))
}

/// POST /api/cart/items
pub async fn add_item(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<AddItemResponse>> {
    if req.product_id <= 0 {
        return Err(AppError::BadRequest("product_id must be positive".to_owned()));
    }
    if req.quantity <= 0 {
        return Err(AppError::BadRequest("quantity must be positive".to_owned()));
    }

    let product_id = ProductId::new(req.product_id);
    CatalogRepository::new(state.pool())
        .get_product(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id} not found")))?;

    let (line_id, quantity) = CartRepository::new(state.pool())
        .add_item(user.user_id, product_id, req.quantity)
        .await?;

    Ok(Json(AddItemResponse {
        line_id: line_id.as_i32(),
        product_id: req.product_id,
        quantity,
    }))
}

/// DELETE /api/cart/items/{product_id}
pub async fn remove_item(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
) -> Result<StatusCode> {
    CartRepository::new(state.pool())
        .remove_item(user.user_id, ProductId::new(product_id))
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound(format!("product {product_id} is not in the cart"))
            }
            other => AppError::Database(other),
        })?;

    Ok(StatusCode::NO_CONTENT)
}
