//! Wishlist domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use clementine_core::{ProductId, UserId, WishlistId, WishlistItemId};

/// A user's wishlist with its entries joined against the catalog.
///
/// Like carts, wishlists are lazily created on first access. Entries are a
/// set: adding a product twice is idempotent and keeps a single entry.
#[derive(Debug, Clone)]
pub struct Wishlist {
    /// Unique wishlist ID.
    pub id: WishlistId,
    /// Owning user (exactly one wishlist per user).
    pub user_id: UserId,
    /// Current entries, one per distinct product.
    pub entries: Vec<WishlistEntry>,
}

/// A single wishlist entry joined with its product.
#[derive(Debug, Clone)]
pub struct WishlistEntry {
    /// Unique entry ID.
    pub id: WishlistItemId,
    /// Referenced product.
    pub product_id: ProductId,
    /// Product name at read time.
    pub product_name: String,
    /// Current catalog unit price.
    pub product_price: Decimal,
    /// Product image URL.
    pub product_image_url: String,
    /// When the product was added.
    pub added_at: DateTime<Utc>,
}
