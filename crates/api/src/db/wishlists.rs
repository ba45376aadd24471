//! Wishlist repository for database operations.
//!
//! Wishlists mirror carts: lazily created, one per user, never deleted.
//! Entries are a set keyed on (wishlist, product); adds are idempotent and
//! report whether the product was already present instead of erroring.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::postgres::PgConnection;

use clementine_core::{ProductId, UserId, WishlistId, WishlistItemId};

use super::RepositoryError;
use crate::models::wishlist::{Wishlist, WishlistEntry};

#[derive(sqlx::FromRow)]
struct WishlistEntryRow {
    id: i32,
    product_id: i32,
    product_name: String,
    product_price: Decimal,
    product_image_url: String,
    added_at: DateTime<Utc>,
}

impl From<WishlistEntryRow> for WishlistEntry {
    fn from(r: WishlistEntryRow) -> Self {
        Self {
            id: WishlistItemId::new(r.id),
            product_id: ProductId::new(r.product_id),
            product_name: r.product_name,
            product_price: r.product_price,
            product_image_url: r.product_image_url,
            added_at: r.added_at,
        }
    }
}

/// Repository for wishlist database operations.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the user's wishlist with its entries, creating an empty wishlist
    /// if none exists yet. Never returns not-found.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_or_create(&self, user_id: UserId) -> Result<Wishlist, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let wishlist_id = ensure_wishlist(&mut tx, user_id).await?;

        let rows = sqlx::query_as::<_, WishlistEntryRow>(
            r"
            SELECT wi.id, wi.product_id, p.name AS product_name,
                   p.price AS product_price, p.image_url AS product_image_url,
                   wi.added_at
            FROM shop.wishlist_item wi
            JOIN shop.product p ON p.id = wi.product_id
            WHERE wi.wishlist_id = $1
            ORDER BY wi.added_at, wi.id
            ",
        )
        .bind(wishlist_id.as_i32())
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Wishlist {
            id: wishlist_id,
            user_id,
            entries: rows.into_iter().map(WishlistEntry::from).collect(),
        })
    }

    /// Add a product to the user's wishlist.
    ///
    /// Idempotent: if the product is already present, no new entry is
    /// created. Returns the entry ID and whether the product was already in
    /// the wishlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(WishlistItemId, bool), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let wishlist_id = ensure_wishlist(&mut tx, user_id).await?;

        let inserted = sqlx::query_scalar::<_, i32>(
            r"
            INSERT INTO shop.wishlist_item (wishlist_id, product_id)
            VALUES ($1, $2)
            ON CONFLICT (wishlist_id, product_id) DO NOTHING
            RETURNING id
            ",
        )
        .bind(wishlist_id.as_i32())
        .bind(product_id.as_i32())
        .fetch_optional(&mut *tx)
        .await?;

        let (entry_id, already_present) = match inserted {
            Some(id) => (id, false),
            None => {
                let id = sqlx::query_scalar::<_, i32>(
                    r"
                    SELECT id FROM shop.wishlist_item
                    WHERE wishlist_id = $1 AND product_id = $2
                    ",
                )
                .bind(wishlist_id.as_i32())
                .bind(product_id.as_i32())
                .fetch_one(&mut *tx)
                .await?;
                (id, true)
            }
        };

        tx.commit().await?;

        Ok((WishlistItemId::new(entry_id), already_present))
    }

    /// Remove a product from the user's wishlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no wishlist or
    /// the product is not in it.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn remove_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM shop.wishlist_item wi
            USING shop.wishlist w
            WHERE wi.wishlist_id = w.id AND w.user_id = $1 AND wi.product_id = $2
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

/// Fetch the user's wishlist ID inside a transaction, inserting the wishlist
/// row if it doesn't exist yet.
async fn ensure_wishlist(
    conn: &mut PgConnection,
    user_id: UserId,
) -> Result<WishlistId, RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO shop.wishlist (user_id)
        VALUES ($1)
        ON CONFLICT (user_id) DO NOTHING
        ",
    )
    .bind(user_id.as_i32())
    .execute(&mut *conn)
    .await?;

    let wishlist_id = sqlx::query_scalar::<_, i32>(
        r"
        SELECT id FROM shop.wishlist WHERE user_id = $1
        ",
    )
    .bind(user_id.as_i32())
    .fetch_one(&mut *conn)
    .await?;

    Ok(WishlistId::new(wishlist_id))
}
