//! Integration tests for wishlists and review upserts.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p clementine-api)
//!
//! Run with: cargo test -p clementine-integration-tests -- --ignored

mod common;

use reqwest::StatusCode;
use serde_json::{Value, json};

use common::{base_url, client, db_pool, grant_admin, login, register, seed_product, unique_email};

// ============================================================================
// Wishlist
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_wishlist_add_is_idempotent() {
    let client = client();
    let pool = db_pool().await;
    let (token, _) = register(&client, &unique_email()).await;
    let product_id = seed_product(&pool, "10.00").await;

    let add = |product_id: i32| {
        let client = &client;
        let token = &token;
        async move {
            let resp = client
                .post(format!("{}/api/wishlist/items", base_url()))
                .bearer_auth(token)
                .json(&json!({ "product_id": product_id }))
                .send()
                .await
                .expect("Failed to add to wishlist");
            assert_eq!(resp.status(), StatusCode::OK);
            resp.json::<Value>().await.expect("Failed to read response")
        }
    };

    let first = add(product_id).await;
    assert_eq!(first["already_in_wishlist"], false);

    let second = add(product_id).await;
    assert_eq!(second["already_in_wishlist"], true);
    assert_eq!(first["item_id"], second["item_id"]);

    // Still a single entry.
    let resp = client
        .get(format!("{}/api/wishlist", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to get wishlist");
    let wishlist: Value = resp.json().await.expect("Failed to read wishlist");
    assert_eq!(wishlist["item_count"], 1);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_wishlist_remove_and_unknown_product() {
    let client = client();
    let pool = db_pool().await;
    let (token, _) = register(&client, &unique_email()).await;
    let product_id = seed_product(&pool, "10.00").await;

    // Unknown product is 404.
    let resp = client
        .post(format!("{}/api/wishlist/items", base_url()))
        .bearer_auth(&token)
        .json(&json!({ "product_id": 999_999_999 }))
        .send()
        .await
        .expect("Failed to add to wishlist");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Removing an absent entry is 404; removing a present one succeeds.
    let resp = client
        .delete(format!("{}/api/wishlist/items/{product_id}", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to remove");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    client
        .post(format!("{}/api/wishlist/items", base_url()))
        .bearer_auth(&token)
        .json(&json!({ "product_id": product_id }))
        .send()
        .await
        .expect("Failed to add to wishlist");

    let resp = client
        .delete(format!("{}/api/wishlist/items/{product_id}", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to remove");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

// ============================================================================
// Reviews
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_resubmitting_a_review_updates_in_place() {
    let client = client();
    let pool = db_pool().await;
    let (token, _) = register(&client, &unique_email()).await;
    let product_id = seed_product(&pool, "10.00").await;

    let submit = |rating: i32, comment: &'static str| {
        let client = &client;
        let token = &token;
        async move {
            client
                .post(format!("{}/api/reviews", base_url()))
                .bearer_auth(token)
                .json(&json!({
                    "product_id": product_id,
                    "rating": rating,
                    "comment": comment,
                }))
                .send()
                .await
                .expect("Failed to submit review")
        }
    };

    let first = submit(4, "Pretty good").await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let first: Value = first.json().await.expect("Failed to read review");
    assert_eq!(first["updated"], false);

    let second = submit(2, "Changed my mind").await;
    assert_eq!(second.status(), StatusCode::OK);
    let second: Value = second.json().await.expect("Failed to read review");
    assert_eq!(second["updated"], true);

    // Same row before and after.
    assert_eq!(first["review"]["id"], second["review"]["id"]);
    assert_eq!(second["review"]["rating"], 2);

    let resp = client
        .get(format!("{}/api/reviews/product/{product_id}", base_url()))
        .send()
        .await
        .expect("Failed to list reviews");
    let reviews: Value = resp.json().await.expect("Failed to read reviews");
    assert_eq!(reviews.as_array().expect("reviews missing").len(), 1);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_review_validation() {
    let client = client();
    let pool = db_pool().await;
    let (token, _) = register(&client, &unique_email()).await;
    let product_id = seed_product(&pool, "10.00").await;

    for rating in [0, 6, -1] {
        let resp = client
            .post(format!("{}/api/reviews", base_url()))
            .bearer_auth(&token)
            .json(&json!({ "product_id": product_id, "rating": rating, "comment": "" }))
            .send()
            .await
            .expect("Failed to submit review");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    let resp = client
        .post(format!("{}/api/reviews", base_url()))
        .bearer_auth(&token)
        .json(&json!({ "product_id": 999_999_999, "rating": 3, "comment": "" }))
        .send()
        .await
        .expect("Failed to submit review");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_average_rating() {
    let client = client();
    let pool = db_pool().await;
    let product_id = seed_product(&pool, "10.00").await;

    // Unreviewed product averages to zero over zero reviews.
    let resp = client
        .get(format!(
            "{}/api/reviews/product/{product_id}/average",
            base_url()
        ))
        .send()
        .await
        .expect("Failed to get average");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to read average");
    assert_eq!(body["review_count"], 0);

    for rating in [2, 4] {
        let (token, _) = register(&client, &unique_email()).await;
        client
            .post(format!("{}/api/reviews", base_url()))
            .bearer_auth(&token)
            .json(&json!({ "product_id": product_id, "rating": rating, "comment": "" }))
            .send()
            .await
            .expect("Failed to submit review");
    }

    let resp = client
        .get(format!(
            "{}/api/reviews/product/{product_id}/average",
            base_url()
        ))
        .send()
        .await
        .expect("Failed to get average");
    let body: Value = resp.json().await.expect("Failed to read average");
    assert_eq!(body["review_count"], 2);
    let average = body["average_rating"].as_f64().expect("average missing");
    assert!((average - 3.0).abs() < f64::EPSILON);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_review_deletion_needs_authorship_or_admin() {
    let client = client();
    let pool = db_pool().await;
    let (author_token, _) = register(&client, &unique_email()).await;
    let product_id = seed_product(&pool, "10.00").await;

    let resp = client
        .post(format!("{}/api/reviews", base_url()))
        .bearer_auth(&author_token)
        .json(&json!({ "product_id": product_id, "rating": 5, "comment": "Great" }))
        .send()
        .await
        .expect("Failed to submit review");
    let body: Value = resp.json().await.expect("Failed to read review");
    let review_id = body["review"]["id"].as_i64().expect("review id missing");

    // A stranger cannot delete it.
    let (stranger_token, _) = register(&client, &unique_email()).await;
    let resp = client
        .delete(format!("{}/api/reviews/{review_id}", base_url()))
        .bearer_auth(&stranger_token)
        .send()
        .await
        .expect("Failed to delete review");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // The author can.
    let resp = client
        .delete(format!("{}/api/reviews/{review_id}", base_url()))
        .bearer_auth(&author_token)
        .send()
        .await
        .expect("Failed to delete review");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // An admin can delete someone else's review.
    let resp = client
        .post(format!("{}/api/reviews", base_url()))
        .bearer_auth(&author_token)
        .json(&json!({ "product_id": product_id, "rating": 5, "comment": "Again" }))
        .send()
        .await
        .expect("Failed to submit review");
    let body: Value = resp.json().await.expect("Failed to read review");
    let review_id = body["review"]["id"].as_i64().expect("review id missing");

    let admin_email = unique_email();
    let (_, admin_id) = register(&client, &admin_email).await;
    grant_admin(&pool, admin_id).await;
    let admin_token = login(&client, &admin_email).await;

    let resp = client
        .delete(format!("{}/api/reviews/{review_id}", base_url()))
        .bearer_auth(&admin_token)
        .send()
        .await
        .expect("Failed to delete review");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}
