//! Salon services and stylists.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use salon_shop_core::{ServiceId, StylistId};
use salon_shop_storefront::api::{ApiJson, ApiResponse};
use salon_shop_storefront::db::{ServiceRepository, StylistRepository};
use salon_shop_storefront::models::{SalonService, SalonServiceInput, Stylist, StylistInput};

use super::{Deleted, not_found};
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

// =============================================================================
// Services
// =============================================================================

pub async fn list_services(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<SalonService>>> {
    let items = ServiceRepository::new(state.pool()).list(true).await?;
    Ok(ApiResponse::ok(items))
}

pub async fn get_service(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ServiceId>,
) -> Result<ApiResponse<SalonService>> {
    let item = ServiceRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| not_found("Service"))?;
    Ok(ApiResponse::ok(item))
}

pub async fn create_service(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SalonServiceInput>,
) -> Result<(StatusCode, ApiResponse<SalonService>)> {
    input.validate()?;
    let item = ServiceRepository::new(state.pool()).create(&input).await?;
    Ok(ApiResponse::created(item))
}

pub async fn update_service(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ServiceId>,
    ApiJson(input): ApiJson<SalonServiceInput>,
) -> Result<ApiResponse<SalonService>> {
    input.validate()?;
    let item = ServiceRepository::new(state.pool()).update(id, &input).await?;
    Ok(ApiResponse::ok(item))
}

pub async fn delete_service(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ServiceId>,
) -> Result<ApiResponse<Deleted<ServiceId>>> {
    ServiceRepository::new(state.pool()).delete(id).await?;
    Ok(ApiResponse::ok(Deleted { id }))
}

// =============================================================================
// Stylists
// =============================================================================

pub async fn list_stylists(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Stylist>>> {
    let items = StylistRepository::new(state.pool()).list(true).await?;
    Ok(ApiResponse::ok(items))
}

pub async fn get_stylist(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<StylistId>,
) -> Result<ApiResponse<Stylist>> {
    let item = StylistRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| not_found("Stylist"))?;
    Ok(ApiResponse::ok(item))
}

pub async fn create_stylist(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<StylistInput>,
) -> Result<(StatusCode, ApiResponse<Stylist>)> {
    input.validate()?;
    let item = StylistRepository::new(state.pool()).create(&input).await?;
    Ok(ApiResponse::created(item))
}

pub async fn update_stylist(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<StylistId>,
    ApiJson(input): ApiJson<StylistInput>,
) -> Result<ApiResponse<Stylist>> {
    input.validate()?;
    let item = StylistRepository::new(state.pool()).update(id, &input).await?;
    Ok(ApiResponse::ok(item))
}

pub async fn delete_stylist(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<StylistId>,
) -> Result<ApiResponse<Deleted<StylistId>>> {
    StylistRepository::new(state.pool()).delete(id).await?;
    Ok(ApiResponse::ok(Deleted { id }))
}
