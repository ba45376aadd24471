//! Category route handlers.
//!
//! Reads are public; mutations require the Admin role claim on the caller's
//! token (no store lookup, see the auth extractors).

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use clementine_core::CategoryId;

use super::products::ProductPayload;
use crate::db::CatalogRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::catalog::Category;
use crate::state::AppState;

/// Category shape returned by listing endpoints.
#[derive(Debug, Serialize)]
pub struct CategoryPayload {
    pub id: i32,
    pub name: String,
    pub description: String,
}

impl From<Category> for CategoryPayload {
    fn from(c: Category) -> Self {
        Self {
            id: c.id.as_i32(),
            name: c.name,
            description: c.description,
        }
    }
}

/// Category with its products, returned by the detail endpoint.
#[derive(Debug, Serialize)]
pub struct CategoryDetailPayload {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub products: Vec<ProductPayload>,
}

/// Create request body.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: String,
}

/// Update request body. The ID must match the path.
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub id: i32,
    pub name: String,
    pub description: String,
}

/// GET /api/categories
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<CategoryPayload>>> {
    let categories = CatalogRepository::new(state.pool()).list_categories().await?;
    Ok(Json(
        categories.into_iter().map(CategoryPayload::from).collect(),
    ))
}

/// GET /api/categories/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CategoryDetailPayload>> {
    let catalog = CatalogRepository::new(state.pool());
    let category_id = CategoryId::new(id);

    let category = catalog
        .get_category(category_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {id} not found")))?;

    let products = catalog.list_products_in_category(category_id).await?;

    Ok(Json(CategoryDetailPayload {
        id: category.id.as_i32(),
        name: category.name,
        description: category.description,
        products: products.into_iter().map(ProductPayload::from).collect(),
    }))
}

/// POST /api/categories (admin)
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse> {
    let category = CatalogRepository::new(state.pool())
        .create_category(&req.name, &req.description)
        .await?;

    Ok((StatusCode::CREATED, Json(CategoryPayload::from(category))))
}

/// PUT /api/categories/{id} (admin)
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateCategoryRequest>,
) -> Result<Json<CategoryPayload>> {
    if req.id != id {
        return Err(AppError::BadRequest(
            "category id in body does not match path".to_owned(),
        ));
    }

    CatalogRepository::new(state.pool())
        .update_category(CategoryId::new(id), &req.name, &req.description)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound(format!("category {id} not found"))
            }
            other => AppError::Database(other),
        })?;

    Ok(Json(CategoryPayload {
        id,
        name: req.name,
        description: req.description,
    }))
}

/// DELETE /api/categories/{id} (admin)
pub async fn remove(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    CatalogRepository::new(state.pool())
        .delete_category(CategoryId::new(id))
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound(format!("category {id} not found"))
            }
            other => AppError::Database(other),
        })?;

    Ok(StatusCode::NO_CONTENT)
}
