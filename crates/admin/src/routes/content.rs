//! Banners, FAQs, testimonials and content blocks.
//!
//! Edits reach the storefront once its five-minute list cache expires.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use salon_shop_core::{BannerId, ContentBlockId, FaqId, TestimonialId};
use salon_shop_storefront::api::{ApiJson, ApiResponse};
use salon_shop_storefront::db::{
    BannerRepository, ContentBlockRepository, FaqRepository, TestimonialRepository,
};
use salon_shop_storefront::models::{
    Banner, BannerInput, ContentBlock, ContentBlockInput, Faq, FaqInput, Testimonial,
    TestimonialInput,
};

use super::{Deleted, not_found};
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

// =============================================================================
// Banners
// =============================================================================

pub async fn list_banners(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Banner>>> {
    let items = BannerRepository::new(state.pool()).list(true).await?;
    Ok(ApiResponse::ok(items))
}

pub async fn get_banner(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<BannerId>,
) -> Result<ApiResponse<Banner>> {
    let item = BannerRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| not_found("Banner"))?;
    Ok(ApiResponse::ok(item))
}

pub async fn create_banner(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<BannerInput>,
) -> Result<(StatusCode, ApiResponse<Banner>)> {
    input.validate()?;
    let item = BannerRepository::new(state.pool()).create(&input).await?;
    Ok(ApiResponse::created(item))
}

pub async fn update_banner(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<BannerId>,
    ApiJson(input): ApiJson<BannerInput>,
) -> Result<ApiResponse<Banner>> {
    input.validate()?;
    let item = BannerRepository::new(state.pool()).update(id, &input).await?;
    Ok(ApiResponse::ok(item))
}

pub async fn delete_banner(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<BannerId>,
) -> Result<ApiResponse<Deleted<BannerId>>> {
    BannerRepository::new(state.pool()).delete(id).await?;
    Ok(ApiResponse::ok(Deleted { id }))
}

// =============================================================================
// FAQs
// =============================================================================

pub async fn list_faqs(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Faq>>> {
    let items = FaqRepository::new(state.pool()).list(true).await?;
    Ok(ApiResponse::ok(items))
}

pub async fn get_faq(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<FaqId>,
) -> Result<ApiResponse<Faq>> {
    let item = FaqRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| not_found("FAQ"))?;
    Ok(ApiResponse::ok(item))
}

pub async fn create_faq(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<FaqInput>,
) -> Result<(StatusCode, ApiResponse<Faq>)> {
    input.validate()?;
    let item = FaqRepository::new(state.pool()).create(&input).await?;
    Ok(ApiResponse::created(item))
}

pub async fn update_faq(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<FaqId>,
    ApiJson(input): ApiJson<FaqInput>,
) -> Result<ApiResponse<Faq>> {
    input.validate()?;
    let item = FaqRepository::new(state.pool()).update(id, &input).await?;
    Ok(ApiResponse::ok(item))
}

pub async fn delete_faq(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<FaqId>,
) -> Result<ApiResponse<Deleted<FaqId>>> {
    FaqRepository::new(state.pool()).delete(id).await?;
    Ok(ApiResponse::ok(Deleted { id }))
}

// =============================================================================
// Testimonials
// =============================================================================

pub async fn list_testimonials(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Testimonial>>> {
    let items = TestimonialRepository::new(state.pool()).list(true).await?;
    Ok(ApiResponse::ok(items))
}

pub async fn get_testimonial(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<TestimonialId>,
) -> Result<ApiResponse<Testimonial>> {
    let item = TestimonialRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| not_found("Testimonial"))?;
    Ok(ApiResponse::ok(item))
}

pub async fn create_testimonial(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<TestimonialInput>,
) -> Result<(StatusCode, ApiResponse<Testimonial>)> {
    input.validate()?;
    let item = TestimonialRepository::new(state.pool()).create(&input).await?;
    Ok(ApiResponse::created(item))
}

pub async fn update_testimonial(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<TestimonialId>,
    ApiJson(input): ApiJson<TestimonialInput>,
) -> Result<ApiResponse<Testimonial>> {
    input.validate()?;
    let item = TestimonialRepository::new(state.pool()).update(id, &input).await?;
    Ok(ApiResponse::ok(item))
}

pub async fn delete_testimonial(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<TestimonialId>,
) -> Result<ApiResponse<Deleted<TestimonialId>>> {
    TestimonialRepository::new(state.pool()).delete(id).await?;
    Ok(ApiResponse::ok(Deleted { id }))
}

// =============================================================================
// Content blocks
// =============================================================================

pub async fn list_content_blocks(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<ContentBlock>>> {
    let items = ContentBlockRepository::new(state.pool()).list().await?;
    Ok(ApiResponse::ok(items))
}

pub async fn get_content_block(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ContentBlockId>,
) -> Result<ApiResponse<ContentBlock>> {
    let item = ContentBlockRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| not_found("Content block"))?;
    Ok(ApiResponse::ok(item))
}

pub async fn create_content_block(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(mut input): ApiJson<ContentBlockInput>,
) -> Result<(StatusCode, ApiResponse<ContentBlock>)> {
    input.validate()?;
    let item = ContentBlockRepository::new(state.pool()).create(&input).await?;
    Ok(ApiResponse::created(item))
}

pub async fn update_content_block(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ContentBlockId>,
    ApiJson(mut input): ApiJson<ContentBlockInput>,
) -> Result<ApiResponse<ContentBlock>> {
    input.validate()?;
    let item = ContentBlockRepository::new(state.pool()).update(id, &input).await?;
    Ok(ApiResponse::ok(item))
}

pub async fn delete_content_block(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ContentBlockId>,
) -> Result<ApiResponse<Deleted<ContentBlockId>>> {
    ContentBlockRepository::new(state.pool()).delete(id).await?;
    Ok(ApiResponse::ok(Deleted { id }))
}
