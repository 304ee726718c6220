//! Marketing content: banners, FAQs, testimonials, promotions and keyed
//! content blocks.

use axum::extract::{Path, State};
use chrono::Utc;

use crate::api::ApiResponse;
use crate::db::{ContentBlockRepository, PromotionRepository};
use crate::error::{AppError, Result};
use crate::models::{Banner, ContentBlock, Faq, Promotion, Testimonial};
use crate::state::AppState;

/// `GET /api/banners`
pub async fn banners(State(state): State<AppState>) -> Result<ApiResponse<Vec<Banner>>> {
    Ok(ApiResponse::ok(state.cache().banners(state.pool()).await?))
}

/// `GET /api/faqs`
pub async fn faqs(State(state): State<AppState>) -> Result<ApiResponse<Vec<Faq>>> {
    Ok(ApiResponse::ok(state.cache().faqs(state.pool()).await?))
}

/// `GET /api/testimonials`
pub async fn testimonials(State(state): State<AppState>) -> Result<ApiResponse<Vec<Testimonial>>> {
    Ok(ApiResponse::ok(state.cache().testimonials(state.pool()).await?))
}

/// `GET /api/promotions`
///
/// Not cached: a promotion's visibility depends on the current time.
pub async fn promotions(State(state): State<AppState>) -> Result<ApiResponse<Vec<Promotion>>> {
    let promotions = PromotionRepository::new(state.pool())
        .list_current(Utc::now())
        .await?;
    Ok(ApiResponse::ok(promotions))
}

/// `GET /api/content/{key}`
pub async fn block(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<ApiResponse<ContentBlock>> {
    let block = ContentBlockRepository::new(state.pool())
        .get_published_by_key(&key)
        .await?
        .ok_or_else(|| AppError::NotFound("Content not found".to_string()))?;
    Ok(ApiResponse::ok(block))
}
