//! Order repository for database operations.
//!
//! Checkout is the one multi-table write in the system: it snapshots the
//! cart's lines at current catalog prices into an immutable order and drains
//! the cart, all inside a single transaction. A failure anywhere rolls the
//! whole conversion back; a committed half-state is a correctness bug.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use clementine_core::{OrderId, OrderItemId, OrderStatus, ProductId, UserId};

use super::RepositoryError;
use crate::models::order::{Order, OrderLine};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    order_date: DateTime<Utc>,
    total_amount: Decimal,
    status: String,
}

impl OrderRow {
    fn into_order(self, lines: Vec<OrderLine>) -> Result<Order, RepositoryError> {
        let status = self.status.parse::<OrderStatus>().map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "unknown order status in database: {}",
                self.status
            ))
        })?;

        Ok(Order {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            order_date: self.order_date,
            total_amount: self.total_amount,
            status,
            lines,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderLineRow {
    id: i32,
    product_id: i32,
    quantity: i32,
    unit_price: Decimal,
    line_total: Decimal,
}

impl From<OrderLineRow> for OrderLine {
    fn from(r: OrderLineRow) -> Self {
        Self {
            id: OrderItemId::new(r.id),
            product_id: ProductId::new(r.product_id),
            quantity: r.quantity,
            unit_price: r.unit_price,
            line_total: r.line_total,
        }
    }
}

/// Cart line joined with its current catalog price, read during checkout.
#[derive(sqlx::FromRow)]
struct CheckoutLineRow {
    product_id: i32,
    quantity: i32,
    price: Decimal,
}

/// Outcome of a status-change attempt on an existing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// The new status was persisted.
    Applied,
    /// The order's current status does not allow the requested move.
    Rejected(OrderStatus),
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Convert the user's cart into a new order.
    ///
    /// In one transaction: reads the cart lines joined with current product
    /// prices, inserts the order (status Pending) with one snapshotted line
    /// per cart line, totals the line amounts, then deletes all cart items.
    /// The cart row itself persists, now empty.
    ///
    /// Returns `None` without writing anything if the user has no cart or
    /// the cart has zero items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails; the
    /// transaction rolls back and nothing is committed.
    pub async fn checkout(&self, user_id: UserId) -> Result<Option<Order>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let cart_id = sqlx::query_scalar::<_, i32>(
            r"
            SELECT id FROM shop.cart WHERE user_id = $1
            ",
        )
        .bind(user_id.as_i32())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(cart_id) = cart_id else {
            return Ok(None);
        };

        let cart_lines = sqlx::query_as::<_, CheckoutLineRow>(
            r"
            SELECT ci.product_id, ci.quantity, p.price
            FROM shop.cart_item ci
            JOIN shop.product p ON p.id = ci.product_id
            WHERE ci.cart_id = $1
            ORDER BY ci.id
            ",
        )
        .bind(cart_id)
        .fetch_all(&mut *tx)
        .await?;

        if cart_lines.is_empty() {
            return Ok(None);
        }

        let total_amount: Decimal = cart_lines
            .iter()
            .map(|l| l.price * Decimal::from(l.quantity))
            .sum();

        let order_row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO shop.customer_order (user_id, order_date, total_amount, status)
            VALUES ($1, now(), $2, $3)
            RETURNING id, user_id, order_date, total_amount, status
            ",
        )
        .bind(user_id.as_i32())
        .bind(total_amount)
        .bind(OrderStatus::Pending.to_string())
        .fetch_one(&mut *tx)
        .await?;

        let mut lines = Vec::with_capacity(cart_lines.len());
        for cart_line in &cart_lines {
            let line_total = cart_line.price * Decimal::from(cart_line.quantity);
            let line_id = sqlx::query_scalar::<_, i32>(
                r"
                INSERT INTO shop.order_item (order_id, product_id, quantity, unit_price, line_total)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id
                ",
            )
            .bind(order_row.id)
            .bind(cart_line.product_id)
            .bind(cart_line.quantity)
            .bind(cart_line.price)
            .bind(line_total)
            .fetch_one(&mut *tx)
            .await?;

            lines.push(OrderLine {
                id: OrderItemId::new(line_id),
                product_id: ProductId::new(cart_line.product_id),
                quantity: cart_line.quantity,
                unit_price: cart_line.price,
                line_total,
            });
        }

        sqlx::query(
            r"
            DELETE FROM shop.cart_item WHERE cart_id = $1
            ",
        )
        .bind(cart_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        order_row.into_order(lines).map(Some)
    }

    /// List a user's orders, newest first, with their lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` on an unknown status value.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, order_date, total_amount, status
            FROM shop.customer_order
            WHERE user_id = $1
            ORDER BY order_date DESC, id DESC
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        self.attach_lines(rows).await
    }

    /// List every order in the store, newest first, with their lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` on an unknown status value.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, order_date, total_amount, status
            FROM shop.customer_order
            ORDER BY order_date DESC, id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        self.attach_lines(rows).await
    }

    /// Get an order by ID with its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` on an unknown status value.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, order_date, total_amount, status
            FROM shop.customer_order
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let lines = self.lines_for(row.id).await?;
        row.into_order(lines).map(Some)
    }

    /// Move an order to a new status, enforcing transition legality against
    /// the order's current status.
    ///
    /// The current status is read with a row lock so a concurrent change
    /// cannot slip an illegal double-transition through.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::DataCorruption` on an unknown status value.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn change_status(
        &self,
        id: OrderId,
        next: OrderStatus,
    ) -> Result<StatusChange, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_scalar::<_, String>(
            r"
            SELECT status FROM shop.customer_order WHERE id = $1 FOR UPDATE
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(current) = current else {
            return Err(RepositoryError::NotFound);
        };

        let current = current.parse::<OrderStatus>().map_err(|_| {
            RepositoryError::DataCorruption(format!("unknown order status in database: {current}"))
        })?;

        if !current.can_transition_to(next) {
            return Ok(StatusChange::Rejected(current));
        }

        sqlx::query(
            r"
            UPDATE shop.customer_order SET status = $2 WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .bind(next.to_string())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(StatusChange::Applied)
    }

    async fn lines_for(&self, order_id: i32) -> Result<Vec<OrderLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderLineRow>(
            r"
            SELECT id, product_id, quantity, unit_price, line_total
            FROM shop.order_item
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderLine::from).collect())
    }

    async fn attach_lines(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let lines = self.lines_for(row.id).await?;
            orders.push(row.into_order(lines)?);
        }
        Ok(orders)
    }
}
