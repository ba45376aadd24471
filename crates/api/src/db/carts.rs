//! Cart repository for database operations.
//!
//! Carts are created lazily on first access and never deleted; checkout
//! drains their lines but keeps the row. Quantity increments happen inside
//! `ON CONFLICT` upserts so concurrent adds for the same product cannot lose
//! updates.

use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::postgres::PgConnection;

use clementine_core::{CartId, CartItemId, ProductId, UserId};

use super::RepositoryError;
use crate::models::cart::{Cart, CartLine};

#[derive(sqlx::FromRow)]
struct CartLineRow {
    id: i32,
    product_id: i32,
    product_name: String,
    product_price: Decimal,
    product_image_url: String,
    quantity: i32,
}

impl From<CartLineRow> for CartLine {
    fn from(r: CartLineRow) -> Self {
        Self {
            id: CartItemId::new(r.id),
            product_id: ProductId::new(r.product_id),
            product_name: r.product_name,
            product_price: r.product_price,
            product_image_url: r.product_image_url,
            quantity: r.quantity,
        }
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the user's cart with its lines, creating an empty cart if none
    /// exists yet. Never returns not-found.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_or_create(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let cart_id = ensure_cart(&mut tx, user_id).await?;

        let rows = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT ci.id, ci.product_id, p.name AS product_name,
                   p.price AS product_price, p.image_url AS product_image_url,
                   ci.quantity
            FROM shop.cart_item ci
            JOIN shop.product p ON p.id = ci.product_id
            WHERE ci.cart_id = $1
            ORDER BY ci.id
            ",
        )
        .bind(cart_id.as_i32())
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Cart {
            id: cart_id,
            user_id,
            lines: rows.into_iter().map(CartLine::from).collect(),
        })
    }

    /// Add `quantity` units of a product to the user's cart.
    ///
    /// If a line for the product already exists its quantity is incremented,
    /// otherwise a new line is inserted. Returns the line ID and the
    /// resulting quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(CartItemId, i32), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let cart_id = ensure_cart(&mut tx, user_id).await?;

        let (line_id, new_quantity) = sqlx::query_as::<_, (i32, i32)>(
            r"
            INSERT INTO shop.cart_item (cart_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (cart_id, product_id)
            DO UPDATE SET quantity = shop.cart_item.quantity + EXCLUDED.quantity
            RETURNING id, quantity
            ",
        )
        .bind(cart_id.as_i32())
        .bind(product_id.as_i32())
        .bind(quantity)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((CartItemId::new(line_id), new_quantity))
    }

    /// Remove the line for a product from the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no cart or the
    /// cart has no line for the product.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn remove_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM shop.cart_item ci
            USING shop.cart c
            WHERE ci.cart_id = c.id AND c.user_id = $1 AND ci.product_id = $2
            ",
        )
        .bind(user_id.as_i32())
        .bind(product_id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

/// Fetch the user's cart ID inside a transaction, inserting the cart row if
/// it doesn't exist yet.
pub(crate) async fn ensure_cart(
    conn: &mut PgConnection,
    user_id: UserId,
) -> Result<CartId, RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO shop.cart (user_id)
        VALUES ($1)
        ON CONFLICT (user_id) DO NOTHING
        ",
    )
    .bind(user_id.as_i32())
    .execute(&mut *conn)
    .await?;

    let cart_id = sqlx::query_scalar::<_, i32>(
        r"
        SELECT id FROM shop.cart WHERE user_id = $1
        ",
    )
    .bind(user_id.as_i32())
    .fetch_one(&mut *conn)
    .await?;

    Ok(CartId::new(cart_id))
}
