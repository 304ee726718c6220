//! Order placement and customer order lookups.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use tracing::instrument;

use super::EmailQuery;
use crate::api::{ApiJson, ApiQuery, ApiResponse};
use crate::db::OrderRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::OrderWithItems;
use crate::services::checkout::{self, PlaceOrderRequest};
use crate::state::AppState;

fn order_not_found() -> AppError {
    AppError::NotFound("Order not found".to_string())
}

/// `POST /api/orders`
///
/// Responds `201 Created` for a new order and `200 OK` when the idempotency
/// key matched an order placed earlier.
#[instrument(skip(state, request), fields(items = request.items.len()))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PlaceOrderRequest>,
) -> Result<(StatusCode, ApiResponse<OrderWithItems>)> {
    add_breadcrumb("checkout", "Place order", None);

    let placed = checkout::place_order(
        state.pool(),
        &state.config().store,
        state.email(),
        request,
        Utc::now(),
    )
    .await?;

    if placed.created {
        Ok(ApiResponse::created(placed.order))
    } else {
        Ok((StatusCode::OK, ApiResponse::ok(placed.order)))
    }
}

/// `GET /api/orders?email=`
#[instrument(skip(state, query))]
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EmailQuery>,
) -> Result<ApiResponse<Vec<OrderWithItems>>> {
    let email = query.parse()?;
    let orders = OrderRepository::new(state.pool())
        .list_for_email(&email)
        .await?;
    Ok(ApiResponse::ok(orders))
}

/// `GET /api/orders/{order_number}?email=`
///
/// A wrong email answers exactly like an unknown order number.
#[instrument(skip(state, query))]
pub async fn show(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
    ApiQuery(query): ApiQuery<EmailQuery>,
) -> Result<ApiResponse<OrderWithItems>> {
    let email = query.parse()?;
    let repo = OrderRepository::new(state.pool());

    let order = repo
        .get_by_number(&order_number)
        .await?
        .filter(|order| order.customer_email == email)
        .ok_or_else(order_not_found)?;
    let items = repo.items(order.id).await?;

    Ok(ApiResponse::ok(OrderWithItems { order, items }))
}
