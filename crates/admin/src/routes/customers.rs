//! Customer lookups and edits.

use axum::extract::{Path, State};
use salon_shop_core::{CustomerId, RewardTier};
use salon_shop_storefront::api::{ApiJson, ApiQuery, ApiResponse, PageParams, Paginated};
use salon_shop_storefront::db::{CustomerFilter, CustomerRepository};
use salon_shop_storefront::models::{Customer, CustomerUpdate, clean_optional};
use serde::Deserialize;
use tracing::instrument;

use super::not_found;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// `GET /api/admin/customers` query.
#[derive(Debug, Default, Deserialize)]
pub struct CustomerListQuery {
    /// Name, email or phone.
    pub search: Option<String>,
    pub tier: Option<RewardTier>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[instrument(skip(_admin, state))]
pub async fn index(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CustomerListQuery>,
) -> Result<ApiResponse<Paginated<Customer>>> {
    let filter = CustomerFilter {
        search: clean_optional(query.search.as_deref()),
        tier: query.tier,
    };
    let params = PageParams {
        page: query.page,
        per_page: query.per_page,
    };
    let (customers, total) = CustomerRepository::new(state.pool())
        .list(&filter, params)
        .await?;
    Ok(ApiResponse::ok(Paginated::new(customers, total, params)))
}

pub async fn show(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CustomerId>,
) -> Result<ApiResponse<Customer>> {
    let customer = CustomerRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| not_found("Customer"))?;
    Ok(ApiResponse::ok(customer))
}

#[instrument(skip(_admin, state, update))]
pub async fn update(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CustomerId>,
    ApiJson(update): ApiJson<CustomerUpdate>,
) -> Result<ApiResponse<Customer>> {
    if update.is_empty() {
        return Err(AppError::BadRequest("Nothing to update".to_string()));
    }
    update.validate()?;
    let customer = CustomerRepository::new(state.pool())
        .update(id, &update)
        .await?;
    Ok(ApiResponse::ok(customer))
}
