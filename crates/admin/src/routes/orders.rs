//! Order management.

use axum::extract::{Path, State};
use salon_shop_core::{OrderId, OrderStatus};
use salon_shop_storefront::api::{ApiJson, ApiQuery, ApiResponse, PageParams, Paginated};
use salon_shop_storefront::db::{OrderFilter, OrderRepository};
use salon_shop_storefront::models::{Order, OrderWithItems, clean_optional};
use serde::Deserialize;
use tracing::instrument;

use super::not_found;
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::services::status;
use crate::state::AppState;

/// `GET /api/admin/orders` query.
#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    /// Order number, customer name or email.
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// `PATCH /api/admin/orders/{id}/status` body.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

#[instrument(skip(_admin, state))]
pub async fn index(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<OrderListQuery>,
) -> Result<ApiResponse<Paginated<Order>>> {
    let filter = OrderFilter {
        status: query.status,
        search: clean_optional(query.search.as_deref()),
    };
    let params = PageParams {
        page: query.page,
        per_page: query.per_page,
    };
    let (orders, total) = OrderRepository::new(state.pool())
        .list(&filter, params)
        .await?;
    Ok(ApiResponse::ok(Paginated::new(orders, total, params)))
}

pub async fn show(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<ApiResponse<OrderWithItems>> {
    let repo = OrderRepository::new(state.pool());
    let order = repo.get(id).await?.ok_or_else(|| not_found("Order"))?;
    let items = repo.items(id).await?;
    Ok(ApiResponse::ok(OrderWithItems { order, items }))
}

#[instrument(skip(_admin, state), fields(status = %update.status))]
pub async fn update_status(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    ApiJson(update): ApiJson<StatusUpdate>,
) -> Result<ApiResponse<OrderWithItems>> {
    let order = status::change_order_status(state.pool(), id, update.status).await?;
    Ok(ApiResponse::ok(order))
}
