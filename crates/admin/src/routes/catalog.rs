//! Products, shipping zones, coupons and promotions.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use salon_shop_core::{CouponId, ProductId, PromotionId, ShippingZoneId};
use salon_shop_storefront::api::{ApiJson, ApiQuery, ApiResponse, PageParams, Paginated};
use salon_shop_storefront::db::{
    CouponRepository, ProductFilter, ProductRepository, ProductSort, PromotionRepository,
    ShippingZoneRepository,
};
use salon_shop_storefront::models::{
    Coupon, CouponInput, Product, ProductInput, Promotion, PromotionInput, ShippingZone,
    ShippingZoneInput, clean_optional,
};
use serde::Deserialize;
use tracing::instrument;

use super::{Deleted, not_found};
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

// =============================================================================
// Products
// =============================================================================

/// `GET /api/admin/products` query. Inactive products are included.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub sort: ProductSort,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[instrument(skip(_admin, state))]
pub async fn list_products(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductListQuery>,
) -> Result<ApiResponse<Paginated<Product>>> {
    let filter = ProductFilter {
        category: clean_optional(query.category.as_deref()),
        search: clean_optional(query.search.as_deref()),
        featured_only: false,
        sort: query.sort,
        include_inactive: true,
    };
    let params = PageParams {
        page: query.page,
        per_page: query.per_page,
    };
    let (products, total) = ProductRepository::new(state.pool())
        .list(&filter, params)
        .await?;
    Ok(ApiResponse::ok(Paginated::new(products, total, params)))
}

pub async fn get_product(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<ApiResponse<Product>> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| not_found("Product"))?;
    Ok(ApiResponse::ok(product))
}

#[instrument(skip(_admin, state, input), fields(slug = %input.slug))]
pub async fn create_product(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<(StatusCode, ApiResponse<Product>)> {
    input.validate()?;
    let product = ProductRepository::new(state.pool()).create(&input).await?;
    tracing::info!(product_id = %product.id, "Product created");
    Ok(ApiResponse::created(product))
}

#[instrument(skip(_admin, state, input))]
pub async fn update_product(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<ApiResponse<Product>> {
    input.validate()?;
    let product = ProductRepository::new(state.pool()).update(id, &input).await?;
    Ok(ApiResponse::ok(product))
}

#[instrument(skip(_admin, state))]
pub async fn delete_product(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<ApiResponse<Deleted<ProductId>>> {
    ProductRepository::new(state.pool()).delete(id).await?;
    tracing::info!(product_id = %id, "Product deleted");
    Ok(ApiResponse::ok(Deleted { id }))
}

// =============================================================================
// Shipping zones
// =============================================================================

pub async fn list_shipping_zones(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<ShippingZone>>> {
    let zones = ShippingZoneRepository::new(state.pool()).list_all().await?;
    Ok(ApiResponse::ok(zones))
}

pub async fn get_shipping_zone(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ShippingZoneId>,
) -> Result<ApiResponse<ShippingZone>> {
    let zone = ShippingZoneRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| not_found("Shipping zone"))?;
    Ok(ApiResponse::ok(zone))
}

pub async fn create_shipping_zone(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ShippingZoneInput>,
) -> Result<(StatusCode, ApiResponse<ShippingZone>)> {
    input.validate()?;
    let zone = ShippingZoneRepository::new(state.pool()).create(&input).await?;
    Ok(ApiResponse::created(zone))
}

pub async fn update_shipping_zone(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ShippingZoneId>,
    ApiJson(input): ApiJson<ShippingZoneInput>,
) -> Result<ApiResponse<ShippingZone>> {
    input.validate()?;
    let zone = ShippingZoneRepository::new(state.pool())
        .update(id, &input)
        .await?;
    Ok(ApiResponse::ok(zone))
}

pub async fn delete_shipping_zone(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ShippingZoneId>,
) -> Result<ApiResponse<Deleted<ShippingZoneId>>> {
    ShippingZoneRepository::new(state.pool()).delete(id).await?;
    Ok(ApiResponse::ok(Deleted { id }))
}

// =============================================================================
// Coupons
// =============================================================================

pub async fn list_coupons(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Coupon>>> {
    let coupons = CouponRepository::new(state.pool()).list().await?;
    Ok(ApiResponse::ok(coupons))
}

pub async fn get_coupon(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CouponId>,
) -> Result<ApiResponse<Coupon>> {
    let coupon = CouponRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| not_found("Coupon"))?;
    Ok(ApiResponse::ok(coupon))
}

#[instrument(skip(_admin, state, input), fields(code = %input.code))]
pub async fn create_coupon(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(mut input): ApiJson<CouponInput>,
) -> Result<(StatusCode, ApiResponse<Coupon>)> {
    input.validate()?;
    let coupon = CouponRepository::new(state.pool()).create(&input).await?;
    tracing::info!(code = %coupon.code, "Coupon created");
    Ok(ApiResponse::created(coupon))
}

#[instrument(skip(_admin, state, input))]
pub async fn update_coupon(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CouponId>,
    ApiJson(mut input): ApiJson<CouponInput>,
) -> Result<ApiResponse<Coupon>> {
    input.validate()?;
    let coupon = CouponRepository::new(state.pool()).update(id, &input).await?;
    Ok(ApiResponse::ok(coupon))
}

pub async fn delete_coupon(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CouponId>,
) -> Result<ApiResponse<Deleted<CouponId>>> {
    CouponRepository::new(state.pool()).delete(id).await?;
    Ok(ApiResponse::ok(Deleted { id }))
}

// =============================================================================
// Promotions
// =============================================================================

pub async fn list_promotions(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Promotion>>> {
    let promotions = PromotionRepository::new(state.pool()).list_all().await?;
    Ok(ApiResponse::ok(promotions))
}

pub async fn get_promotion(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<PromotionId>,
) -> Result<ApiResponse<Promotion>> {
    let promotion = PromotionRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| not_found("Promotion"))?;
    Ok(ApiResponse::ok(promotion))
}

pub async fn create_promotion(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(mut input): ApiJson<PromotionInput>,
) -> Result<(StatusCode, ApiResponse<Promotion>)> {
    input.validate()?;
    let promotion = PromotionRepository::new(state.pool()).create(&input).await?;
    Ok(ApiResponse::created(promotion))
}

pub async fn update_promotion(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<PromotionId>,
    ApiJson(mut input): ApiJson<PromotionInput>,
) -> Result<ApiResponse<Promotion>> {
    input.validate()?;
    let promotion = PromotionRepository::new(state.pool())
        .update(id, &input)
        .await?;
    Ok(ApiResponse::ok(promotion))
}

pub async fn delete_promotion(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<PromotionId>,
) -> Result<ApiResponse<Deleted<PromotionId>>> {
    PromotionRepository::new(state.pool()).delete(id).await?;
    Ok(ApiResponse::ok(Deleted { id }))
}
