//! Order route handlers.
//!
//! Checkout converts the caller's cart into an immutable order in one
//! transaction. Orders are visible to their owner and to admins; status
//! changes are admin-only and validated against the status state machine.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use clementine_core::{OrderId, OrderStatus};

use crate::db::{OrderRepository, StatusChange};
use crate::error::{AppError, Result};
use crate::middleware::{CurrentUser, RequireAdmin};
use crate::models::order::Order;
use crate::state::AppState;

/// Order shape returned to the client.
#[derive(Debug, Serialize)]
pub struct OrderPayload {
    pub id: i32,
    pub user_id: i32,
    pub order_date: DateTime<Utc>,
    pub total_amount: Decimal,
    pub status: String,
    pub items: Vec<OrderLinePayload>,
}

/// A single snapshotted order line.
#[derive(Debug, Serialize)]
pub struct OrderLinePayload {
    pub id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl From<Order> for OrderPayload {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.as_i32(),
            user_id: order.user_id.as_i32(),
            order_date: order.order_date,
            total_amount: order.total_amount,
            status: order.status.to_string(),
            items: order
                .lines
                .into_iter()
                .map(|l| OrderLinePayload {
                    id: l.id.as_i32(),
                    product_id: l.product_id.as_i32(),
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                    line_total: l.line_total,
                })
                .collect(),
        }
    }
}

/// Status-change request body.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Status-change confirmation payload.
#[derive(Debug, Serialize)]
pub struct UpdateStatusResponse {
    pub order_id: i32,
    pub status: String,
}

/// POST /api/orders (checkout)
pub async fn checkout(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let order = OrderRepository::new(state.pool())
        .checkout(user.user_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("cart is empty".to_owned()))?;

    tracing::info!(
        user_id = %user.user_id,
        order_id = %order.id,
        total = %order.total_amount,
        "order placed"
    );

    Ok((StatusCode::CREATED, Json(OrderPayload::from(order))))
}

/// GET /api/orders
///
/// Own orders; every order in the store when the caller is an admin.
pub async fn list(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderPayload>>> {
    let repo = OrderRepository::new(state.pool());
    let orders = if user.claims.is_admin() {
        repo.list_all().await?
    } else {
        repo.list_for_user(user.user_id).await?
    };

    Ok(Json(orders.into_iter().map(OrderPayload::from).collect()))
}

/// GET /api/orders/{id}
pub async fn show(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<OrderPayload>> {
    let order = OrderRepository::new(state.pool())
        .get_by_id(OrderId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

    if order.user_id != user.user_id && !user.claims.is_admin() {
        return Err(AppError::Forbidden(
            "orders are visible to their owner and admins only".to_owned(),
        ));
    }

    Ok(Json(OrderPayload::from(order)))
}

/// PUT /api/orders/{id}/status (admin)
pub async fn update_status(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<UpdateStatusResponse>> {
    let next = req
        .status
        .parse::<OrderStatus>()
        .map_err(|_| AppError::BadRequest(format!("unknown order status: {}", req.status)))?;

    let outcome = OrderRepository::new(state.pool())
        .change_status(OrderId::new(id), next)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound(format!("order {id} not found"))
            }
            other => AppError::Database(other),
        })?;

    match outcome {
        StatusChange::Applied => Ok(Json(UpdateStatusResponse {
            order_id: id,
            status: next.to_string(),
        })),
        StatusChange::Rejected(current) => Err(AppError::BadRequest(format!(
            "cannot move order from {current} to {next}"
        ))),
    }
}
