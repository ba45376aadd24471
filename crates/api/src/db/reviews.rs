//! Review repository for database operations.
//!
//! One review per (user, product): submission is an upsert keyed on that
//! pair, so a resubmission overwrites the existing row in place and the
//! review ID stays stable across updates.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use clementine_core::{ProductId, ReviewId, UserId};

use super::RepositoryError;
use crate::models::review::Review;

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: i32,
    user_id: i32,
    reviewer_name: String,
    product_id: i32,
    rating: i32,
    comment: String,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(r: ReviewRow) -> Self {
        Self {
            id: ReviewId::new(r.id),
            user_id: UserId::new(r.user_id),
            reviewer_name: r.reviewer_name,
            product_id: ProductId::new(r.product_id),
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at,
        }
    }
}

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create or overwrite the user's review of a product.
    ///
    /// If the user has already reviewed the product, its rating and comment
    /// are replaced and the timestamp refreshed; the ID does not change.
    /// Returns the resulting review and whether an existing one was updated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn upsert(
        &self,
        user_id: UserId,
        product_id: ProductId,
        rating: i32,
        comment: &str,
    ) -> Result<(Review, bool), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_scalar::<_, i32>(
            r"
            SELECT id FROM shop.review
            WHERE user_id = $1 AND product_id = $2
            ",
        )
        .bind(user_id.as_i32())
        .bind(product_id.as_i32())
        .fetch_optional(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, ReviewRow>(
            r"
            INSERT INTO shop.review (user_id, product_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET rating = EXCLUDED.rating,
                          comment = EXCLUDED.comment,
                          created_at = now()
            RETURNING id, user_id,
                      (SELECT first_name || ' ' || last_name
                       FROM shop.users WHERE id = user_id) AS reviewer_name,
                      product_id, rating, comment, created_at
            ",
        )
        .bind(user_id.as_i32())
        .bind(product_id.as_i32())
        .bind(rating)
        .bind(comment)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((Review::from(row), existing.is_some()))
    }

    /// List a product's reviews, newest first, with reviewer display names.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r"
            SELECT rv.id, rv.user_id,
                   u.first_name || ' ' || u.last_name AS reviewer_name,
                   rv.product_id, rv.rating, rv.comment, rv.created_at
            FROM shop.review rv
            JOIN shop.users u ON u.id = rv.user_id
            WHERE rv.product_id = $1
            ORDER BY rv.created_at DESC, rv.id DESC
            ",
        )
        .bind(product_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Review::from).collect())
    }

    /// Average rating and review count for a product.
    ///
    /// An unreviewed product yields `(0.0, 0)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn average_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<(f64, i64), RepositoryError> {
        let (average, count) = sqlx::query_as::<_, (Option<f64>, i64)>(
            r"
            SELECT AVG(rating)::float8, COUNT(*)
            FROM shop.review
            WHERE product_id = $1
            ",
        )
        .bind(product_id.as_i32())
        .fetch_one(self.pool)
        .await?;

        Ok((average.unwrap_or(0.0), count))
    }

    /// Get a review by ID, with its reviewer's display name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(
            r"
            SELECT rv.id, rv.user_id,
                   u.first_name || ' ' || u.last_name AS reviewer_name,
                   rv.product_id, rv.rating, rv.comment, rv.created_at
            FROM shop.review rv
            JOIN shop.users u ON u.id = rv.user_id
            WHERE rv.id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Review::from))
    }

    /// Delete a review.
    ///
    /// Authorization (author or admin) is the caller's responsibility.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: ReviewId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM shop.review WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
