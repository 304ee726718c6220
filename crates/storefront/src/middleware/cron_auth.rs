//! Bearer-secret guard for the cron reminder route.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::bearer::bearer_token;
use crate::config::env::secret_matches;
use crate::error::AppError;
use crate::state::AppState;

/// Extractor that requires `Authorization: Bearer <CRON_SECRET>`.
///
/// # Example
///
/// ```rust,ignore
/// async fn run_job(_: RequireCronSecret, State(state): State<AppState>) -> Result<...> {
///     ...
/// }
/// ```
pub struct RequireCronSecret;

impl FromRequestParts<AppState> for RequireCronSecret {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let authorized = bearer_token(&parts.headers)
            .is_some_and(|token| secret_matches(token, &state.config().cron_secret));

        if !authorized {
            tracing::warn!(path = %parts.uri.path(), "Rejected cron request with missing or wrong secret");
            return Err(AppError::Unauthorized("Unauthorized".to_string()));
        }
        Ok(Self)
    }
}
