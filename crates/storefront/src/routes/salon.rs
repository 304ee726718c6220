//! Salon service menu and stylists.

use axum::extract::State;

use crate::api::ApiResponse;
use crate::error::Result;
use crate::models::{SalonService, Stylist};
use crate::state::AppState;

/// `GET /api/services`
pub async fn services(State(state): State<AppState>) -> Result<ApiResponse<Vec<SalonService>>> {
    let services = state.cache().services(state.pool()).await?;
    Ok(ApiResponse::ok(services))
}

/// `GET /api/stylists`
pub async fn stylists(State(state): State<AppState>) -> Result<ApiResponse<Vec<Stylist>>> {
    let stylists = state.cache().stylists(state.pool()).await?;
    Ok(ApiResponse::ok(stylists))
}
