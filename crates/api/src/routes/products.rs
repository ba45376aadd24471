//! Product route handlers. Public reads over catalog reference data.

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::Serialize;

use clementine_core::ProductId;

use crate::db::CatalogRepository;
use crate::error::{AppError, Result};
use crate::models::catalog::Product;
use crate::state::AppState;

/// Product shape returned by catalog endpoints.
#[derive(Debug, Serialize)]
pub struct ProductPayload {
    pub id: i32,
    pub category_id: i32,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: String,
}

impl From<Product> for ProductPayload {
    fn from(p: Product) -> Self {
        Self {
            id: p.id.as_i32(),
            category_id: p.category_id.as_i32(),
            name: p.name,
            description: p.description,
            price: p.price,
            image_url: p.image_url,
        }
    }
}

/// GET /api/products
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ProductPayload>>> {
    let products = CatalogRepository::new(state.pool()).list_products().await?;
    Ok(Json(products.into_iter().map(ProductPayload::from).collect()))
}

/// GET /api/products/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProductPayload>> {
    let product = CatalogRepository::new(state.pool())
        .get_product(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id} not found")))?;

    Ok(Json(ProductPayload::from(product)))
}
