//! Wishlist route handlers.
//!
//! Adds are idempotent: re-adding a product reports `already_in_wishlist`
//! with the existing entry rather than erroring or duplicating.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use clementine_core::ProductId;

use crate::db::{CatalogRepository, WishlistRepository};
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::wishlist::Wishlist;
use crate::state::AppState;

/// Wishlist shape returned to the client.
#[derive(Debug, Serialize)]
pub struct WishlistResponse {
    pub id: i32,
    pub items: Vec<WishlistItemPayload>,
    pub item_count: usize,
}

/// A single wishlist entry with its product joined in.
#[derive(Debug, Serialize)]
pub struct WishlistItemPayload {
    pub id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub product_price: Decimal,
    pub image_url: String,
    pub added_at: DateTime<Utc>,
}

impl From<Wishlist> for WishlistResponse {
    fn from(wishlist: Wishlist) -> Self {
        let items: Vec<WishlistItemPayload> = wishlist
            .entries
            .into_iter()
            .map(|e| WishlistItemPayload {
                id: e.id.as_i32(),
                product_id: e.product_id.as_i32(),
                product_name: e.product_name,
                product_price: e.product_price,
                image_url: e.product_image_url,
                added_at: e.added_at,
            })
            .collect();

        Self {
            id: wishlist.id.as_i32(),
            item_count: items.len(),
            items,
        }
    }
}

/// Add-item request body.
#[derive(Debug, Deserialize)]
pub struct AddWishlistItemRequest {
    pub product_id: i32,
}

/// Add-item result.
#[derive(Debug, Serialize)]
pub struct AddWishlistItemResponse {
    pub item_id: i32,
    pub product_id: i32,
    pub already_in_wishlist: bool,
}

/// GET /api/wishlist
pub async fn show(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<WishlistResponse>> {
    let wishlist = WishlistRepository::new(state.pool())
        .get_or_create(user.user_id)
        .await?;

    Ok(Json(WishlistResponse::from(wishlist)))
}

/// POST /api/wishlist/items
pub async fn add_item(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(req): Json<AddWishlistItemRequest>,
) -> Result<Json<AddWishlistItemResponse>> {
    if req.product_id <= 0 {
        return Err(AppError::BadRequest("product_id must be positive".to_owned()));
    }

    let product_id = ProductId::new(req.product_id);
    CatalogRepository::new(state.pool())
        .get_product(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id} not found")))?;

    let (item_id, already_in_wishlist) = WishlistRepository::new(state.pool())
        .add_item(user.user_id, product_id)
        .await?;

    Ok(Json(AddWishlistItemResponse {
        item_id: item_id.as_i32(),
        product_id: req.product_id,
        already_in_wishlist,
    }))
}

/// DELETE /api/wishlist/items/{product_id}
pub async fn remove_item(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
) -> Result<StatusCode> {
    WishlistRepository::new(state.pool())
        .remove_item(user.user_id, ProductId::new(product_id))
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound(format!("product {product_id} is not in the wishlist"))
            }
            other => AppError::Database(other),
        })?;

    Ok(StatusCode::NO_CONTENT)
}
