//! Review domain types.

use chrono::{DateTime, Utc};

use clementine_core::{ProductId, ReviewId, UserId};

/// A product review joined with its reviewer's display name.
///
/// One review per (user, product); a resubmission overwrites the existing
/// row in place, so the ID is stable across updates.
#[derive(Debug, Clone)]
pub struct Review {
    /// Unique review ID, stable across updates.
    pub id: ReviewId,
    /// Reviewing user.
    pub user_id: UserId,
    /// Reviewer's display name, for listing.
    pub reviewer_name: String,
    /// Reviewed product.
    pub product_id: ProductId,
    /// Star rating in 1..=5.
    pub rating: i32,
    /// Free-form comment.
    pub comment: String,
    /// When the review was created or last overwritten.
    pub created_at: DateTime<Utc>,
}
