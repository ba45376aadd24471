//! Order domain types.
//!
//! Orders are immutable snapshots of a cart at checkout time. Unit prices
//! are captured into each line and the total is computed once at creation;
//! later catalog price changes never touch an existing order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use clementine_core::{OrderId, OrderItemId, OrderStatus, ProductId, UserId};

/// A placed order with its snapshotted lines.
#[derive(Debug, Clone)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// User who placed the order.
    pub user_id: UserId,
    /// When the order was placed.
    pub order_date: DateTime<Utc>,
    /// Sum of line totals, fixed at creation.
    pub total_amount: Decimal,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// Immutable snapshot lines.
    pub lines: Vec<OrderLine>,
}

/// A single order line with its price snapshot.
#[derive(Debug, Clone)]
pub struct OrderLine {
    /// Unique line ID.
    pub id: OrderItemId,
    /// Product the line was created from.
    pub product_id: ProductId,
    /// Units ordered.
    pub quantity: i32,
    /// Catalog unit price at checkout time.
    pub unit_price: Decimal,
    /// `unit_price` × `quantity`, fixed at creation.
    pub line_total: Decimal,
}
