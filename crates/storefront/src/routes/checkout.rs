//! Coupon checks and pricing previews.

use axum::extract::State;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use crate::api::{ApiJson, ApiResponse};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::checkout::{self, CouponValidation, QuoteRequest, QuoteResponse};
use crate::state::AppState;

/// `POST /api/coupons/validate` body.
#[derive(Debug, Deserialize)]
pub struct ValidateCouponRequest {
    pub code: String,
    pub subtotal: Decimal,
}

/// `POST /api/coupons/validate`
#[instrument(skip(state, request), fields(code = %request.code))]
pub async fn validate_coupon(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ValidateCouponRequest>,
) -> Result<ApiResponse<CouponValidation>> {
    let code = request.code.trim();
    if code.is_empty() {
        return Err(AppError::BadRequest("Please enter a coupon code".to_string()));
    }
    add_breadcrumb("checkout", "Validate coupon", Some(&[("code", code)]));

    let validation =
        checkout::validate_coupon(state.pool(), code, request.subtotal, Utc::now()).await?;
    Ok(ApiResponse::ok(validation))
}

/// `POST /api/checkout/quote`
#[instrument(skip(state, request), fields(items = request.items.len()))]
pub async fn quote(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<QuoteRequest>,
) -> Result<ApiResponse<QuoteResponse>> {
    let quote = checkout::quote_cart(state.pool(), &state.config().store, &request, Utc::now()).await?;
    Ok(ApiResponse::ok(quote))
}
