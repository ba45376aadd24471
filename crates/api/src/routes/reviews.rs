//! Review route handlers.
//!
//! A user holds at most one review per product: submitting again overwrites
//! the existing review in place and the response says which happened.
//! Deletion is allowed to the review's author or an admin.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clementine_core::{ProductId, ReviewId};

use crate::db::{CatalogRepository, ReviewRepository};
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::review::Review;
use crate::state::AppState;

/// Ratings are whole stars from 1 to 5.
const RATING_RANGE: std::ops::RangeInclusive<i32> = 1..=5;

/// Review shape returned to the client.
#[derive(Debug, Serialize)]
pub struct ReviewPayload {
    pub id: i32,
    pub product_id: i32,
    pub user_id: i32,
    pub reviewer_name: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<Review> for ReviewPayload {
    fn from(r: Review) -> Self {
        Self {
            id: r.id.as_i32(),
            product_id: r.product_id.as_i32(),
            user_id: r.user_id.as_i32(),
            reviewer_name: r.reviewer_name,
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at,
        }
    }
}

/// Submission request body.
#[derive(Debug, Deserialize)]
pub struct SubmitReviewRequest {
    pub product_id: i32,
    pub rating: i32,
    pub comment: String,
}

/// Submission result; `updated` distinguishes overwrite from creation.
#[derive(Debug, Serialize)]
pub struct SubmitReviewResponse {
    pub review: ReviewPayload,
    pub updated: bool,
}

/// Average rating payload.
#[derive(Debug, Serialize)]
pub struct AverageRatingResponse {
    pub product_id: i32,
    pub average_rating: f64,
    pub review_count: i64,
}

/// POST /api/reviews
pub async fn submit(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(req): Json<SubmitReviewRequest>,
) -> Result<impl IntoResponse> {
    if !RATING_RANGE.contains(&req.rating) {
        return Err(AppError::BadRequest(
            "rating must be between 1 and 5".to_owned(),
        ));
    }

    let product_id = ProductId::new(req.product_id);
    CatalogRepository::new(state.pool())
        .get_product(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id} not found")))?;

    let (review, updated) = ReviewRepository::new(state.pool())
        .upsert(user.user_id, product_id, req.rating, &req.comment)
        .await?;

    let status = if updated {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    Ok((
        status,
        Json(SubmitReviewResponse {
            review: ReviewPayload::from(review),
            updated,
        }),
    ))
}

/// GET /api/reviews/product/{id}
pub async fn list_for_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ReviewPayload>>> {
    let product_id = ProductId::new(id);
    CatalogRepository::new(state.pool())
        .get_product(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id} not found")))?;

    let reviews = ReviewRepository::new(state.pool())
        .list_for_product(product_id)
        .await?;

    Ok(Json(reviews.into_iter().map(ReviewPayload::from).collect()))
}

/// GET /api/reviews/product/{id}/average
pub async fn average_for_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<AverageRatingResponse>> {
    let product_id = ProductId::new(id);
    CatalogRepository::new(state.pool())
        .get_product(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id} not found")))?;

    let (average_rating, review_count) = ReviewRepository::new(state.pool())
        .average_for_product(product_id)
        .await?;

    Ok(Json(AverageRatingResponse {
        product_id: id,
        average_rating,
        review_count,
    }))
}

/// DELETE /api/reviews/{id}
///
/// Allowed to the review's author or an admin.
pub async fn remove(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    let reviews = ReviewRepository::new(state.pool());

    let review = reviews
        .get_by_id(ReviewId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("review {id} not found")))?;

    if review.user_id != user.user_id && !user.claims.is_admin() {
        return Err(AppError::Forbidden(
            "reviews can be deleted by their author or an admin".to_owned(),
        ));
    }

    reviews.delete(review.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
