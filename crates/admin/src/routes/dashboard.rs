//! Dashboard counters.

use axum::extract::State;
use salon_shop_storefront::api::ApiResponse;

use crate::db::{DashboardRepository, DashboardStats};
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// `GET /api/admin/dashboard`
pub async fn show(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<ApiResponse<DashboardStats>> {
    let stats = DashboardRepository::new(state.pool()).stats().await?;
    Ok(ApiResponse::ok(stats))
}
