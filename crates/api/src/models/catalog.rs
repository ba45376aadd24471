//! Catalog domain types.
//!
//! Categories and products are read-mostly reference data. Prices are
//! `Decimal` throughout; the checkout path snapshots them into order lines.

use rust_decimal::Decimal;

use clementine_core::{CategoryId, ProductId};

/// A product category.
#[derive(Debug, Clone)]
pub struct Category {
    /// Unique category ID.
    pub id: CategoryId,
    /// Category name.
    pub name: String,
    /// Free-form description.
    pub description: String,
}

/// A catalog product.
#[derive(Debug, Clone)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Owning category.
    pub category_id: CategoryId,
    /// Product name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Current unit price.
    pub price: Decimal,
    /// Image URL for display.
    pub image_url: String,
}
