//! Cart domain types.

use rust_decimal::Decimal;

use clementine_core::{CartId, CartItemId, ProductId, UserId};

/// A user's shopping cart with its lines joined against the catalog.
///
/// Carts are lazily created on first access, so fetching one never fails
/// with not-found. The cart row outlives checkout; only its lines are
/// drained.
#[derive(Debug, Clone)]
pub struct Cart {
    /// Unique cart ID.
    pub id: CartId,
    /// Owning user (exactly one cart per user).
    pub user_id: UserId,
    /// Current lines, one per distinct product.
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| i64::from(l.quantity)).sum()
    }

    /// Sum of line totals at current catalog prices.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}

/// A single cart line joined with its product.
#[derive(Debug, Clone)]
pub struct CartLine {
    /// Unique line ID.
    pub id: CartItemId,
    /// Referenced product.
    pub product_id: ProductId,
    /// Product name at read time.
    pub product_name: String,
    /// Current catalog unit price (not yet snapshotted).
    pub product_price: Decimal,
    /// Product image URL.
    pub product_image_url: String,
    /// Units of this product in the cart, always positive.
    pub quantity: i32,
}

impl CartLine {
    /// Extended price of this line at the current catalog price.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product_price * Decimal::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product: i32, price: Decimal, quantity: i32) -> CartLine {
        CartLine {
            id: CartItemId::new(product),
            product_id: ProductId::new(product),
            product_name: format!("product-{product}"),
            product_price: price,
            product_image_url: String::new(),
            quantity,
        }
    }

    #[test]
    fn test_totals_sum_over_lines() {
        let cart = Cart {
            id: CartId::new(1),
            user_id: UserId::new(1),
            lines: vec![
                line(1, Decimal::new(1000, 2), 2),
                line(2, Decimal::new(500, 2), 1),
            ],
        };
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total_price(), Decimal::new(2500, 2));
    }

    #[test]
    fn test_empty_cart_totals_are_zero() {
        let cart = Cart {
            id: CartId::new(1),
            user_id: UserId::new(1),
            lines: vec![],
        };
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.total_price(), Decimal::ZERO);
    }
}
