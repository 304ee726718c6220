//! Authentication extractor for admin.
//!
//! The admin API has no sessions: every request carries
//! `Authorization: Bearer <ADMIN_API_TOKEN>`.

use axum::{extract::FromRequestParts, http::request::Parts};
use salon_shop_storefront::config::env::secret_matches;
use salon_shop_storefront::middleware::bearer_token;

use crate::error::AppError;
use crate::state::AppState;

/// Extractor that requires the admin bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(_admin: RequireAdminAuth) -> impl IntoResponse {
///     "only admins see this"
/// }
/// ```
pub struct RequireAdminAuth;

impl FromRequestParts<AppState> for RequireAdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let authorized = bearer_token(&parts.headers)
            .is_some_and(|token| secret_matches(token, &state.config().api_token));

        if !authorized {
            tracing::warn!(
                method = %parts.method,
                path = %parts.uri.path(),
                "Rejected admin request with missing or wrong token"
            );
            return Err(AppError::Unauthorized("Unauthorized".to_string()));
        }
        Ok(Self)
    }
}
