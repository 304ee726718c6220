//! JSON response envelope and pagination shared by every endpoint.
//!
//! Successful responses look like `{"success": true, "data": ...}`; failures
//! are produced by [`crate::error::AppError`] as
//! `{"success": false, "error": "..."}`.

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// JSON body extractor whose rejection is the error envelope instead of
/// axum's plain-text 4xx.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor with an envelope rejection.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Uniform response envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful response with `data`.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Successful response sent with `201 Created`.
    pub fn created(data: T) -> (StatusCode, Self) {
        (StatusCode::CREATED, Self::ok(data))
    }
}

impl ApiResponse<()> {
    /// Failed response carrying a user-facing message.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Default page size for list endpoints.
pub const DEFAULT_PER_PAGE: u32 = 12;
/// Largest page a client may request.
pub const MAX_PER_PAGE: u32 = 100;

/// `?page=&per_page=` query parameters. Pages are 1-based.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageParams {
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    #[must_use]
    pub fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }

    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page())
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * self.limit()
    }
}

/// One page of a larger result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    #[must_use]
    pub fn new(items: Vec<T>, total: i64, params: PageParams) -> Self {
        let per_page = params.per_page();
        let total_pages = if total <= 0 {
            0
        } else {
            (total + i64::from(per_page) - 1) / i64::from(per_page)
        };
        Self {
            items,
            total,
            page: params.page(),
            per_page,
            total_pages,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_omits_missing_fields() {
        let json = serde_json::to_value(ApiResponse::ok(vec![1, 2])).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": [1, 2]}));

        let json = serde_json::to_value(ApiResponse::failure("Cart is empty")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "error": "Cart is empty"})
        );
    }

    #[test]
    fn test_page_params_clamp() {
        let params = PageParams {
            page: Some(0),
            per_page: Some(500),
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.per_page(), MAX_PER_PAGE);
        assert_eq!(params.offset(), 0);

        let params = PageParams {
            page: Some(3),
            per_page: None,
        };
        assert_eq!(params.offset(), 24);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let params = PageParams {
            page: Some(1),
            per_page: Some(10),
        };
        assert_eq!(Paginated::<u8>::new(vec![], 21, params).total_pages, 3);
        assert_eq!(Paginated::<u8>::new(vec![], 0, params).total_pages, 0);
    }
}
