//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`,
//! and every failure leaves the server as the JSON envelope
//! `{"success": false, "error": "<message>"}`.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use salon_shop_core::pricing::PricingError;
use thiserror::Error;

use crate::api::ApiResponse;
use crate::db::RepositoryError;
use crate::models::ValidationError;
use crate::services::booking::BookingError;
use crate::services::checkout::CheckoutError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Pricing or order placement failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Availability lookup or booking failed.
    #[error("Booking error: {0}")]
    Booking(#[from] BookingError),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Missing or wrong credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// Request conflicts with current state.
    #[error("{0}")]
    Conflict(String),

    /// A dependency the endpoint needs is not configured.
    #[error("{0}")]
    ServiceUnavailable(String),

    /// Rate limited.
    #[error("Too many requests")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

const INTERNAL_MESSAGE: &str = "Internal server error";

fn repository_status(err: &RepositoryError) -> (StatusCode, String) {
    match err {
        RepositoryError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
        RepositoryError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
        }
    }
}

fn pricing_message(err: &PricingError) -> String {
    match err {
        PricingError::EmptyCart => "Your cart is empty".to_string(),
        PricingError::InvalidQuantity { .. } => "Each item needs a quantity of at least 1".to_string(),
        PricingError::NegativePrice { .. } => "A product has an invalid price".to_string(),
        PricingError::NegativeDiscount => "Invalid discount".to_string(),
        PricingError::MissingShippingZone => "Please choose a shipping zone".to_string(),
        PricingError::SubtotalTooLarge => "This order is too large to place online".to_string(),
    }
}

impl AppError {
    /// Status code and client-facing message. Internal details never leave
    /// the server.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Database(err) => repository_status(err),
            Self::Checkout(err) => match err {
                CheckoutError::Invalid(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                CheckoutError::Pricing(err) => (StatusCode::BAD_REQUEST, pricing_message(err)),
                CheckoutError::Coupon(rejection) => {
                    (StatusCode::BAD_REQUEST, rejection.to_string())
                }
                CheckoutError::CouponNotFound => {
                    (StatusCode::NOT_FOUND, "Coupon not found".to_string())
                }
                CheckoutError::ProductUnavailable(_) | CheckoutError::ShippingZoneUnavailable => {
                    (StatusCode::BAD_REQUEST, err.to_string())
                }
                CheckoutError::OutOfStock { .. } | CheckoutError::IdempotencyKeyReused => {
                    (StatusCode::CONFLICT, err.to_string())
                }
                CheckoutError::Repository(err) => repository_status(err),
                CheckoutError::Database(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
                }
            },
            Self::Booking(err) => match err {
                BookingError::Invalid(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                BookingError::InPast | BookingError::OutsideHours => {
                    (StatusCode::BAD_REQUEST, err.to_string())
                }
                BookingError::ServiceNotFound | BookingError::StylistNotFound => {
                    (StatusCode::NOT_FOUND, err.to_string())
                }
                BookingError::SlotTaken => (StatusCode::CONFLICT, err.to_string()),
                BookingError::Repository(err) => repository_status(err),
                BookingError::Database(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
                }
            },
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            Self::RateLimited => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_MESSAGE.to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        // Capture server errors to Sentry
        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, ApiResponse::failure(message)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::BadRequest(err.0)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for customer actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
