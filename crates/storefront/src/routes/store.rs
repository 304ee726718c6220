//! Store-wide settings and shipping zones.

use axum::extract::State;
use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::api::ApiResponse;
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::models::ShippingZone;
use crate::state::AppState;

/// Public store settings the frontend needs before rendering a cart or a
/// booking form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreSettings {
    pub name: String,
    pub currency: &'static str,
    pub currency_symbol: &'static str,
    pub free_shipping_threshold: Option<Decimal>,
    pub pickup_address: Option<String>,
    pub booking: BookingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingSettings {
    pub opens_at: NaiveTime,
    pub closes_at: NaiveTime,
    pub slot_minutes: u32,
    /// Salon-local offset from UTC, e.g. `+02:00`.
    pub utc_offset: String,
}

impl From<&StorefrontConfig> for StoreSettings {
    fn from(config: &StorefrontConfig) -> Self {
        let hours = &config.booking.hours;
        Self {
            name: config.store.name.clone(),
            currency: config.store.currency.code(),
            currency_symbol: config.store.currency.symbol(),
            free_shipping_threshold: config.store.free_shipping_threshold,
            pickup_address: config.store.pickup_address.clone(),
            booking: BookingSettings {
                opens_at: hours.open(),
                closes_at: hours.close(),
                slot_minutes: hours.slot_minutes(),
                utc_offset: config.booking.utc_offset.to_string(),
            },
        }
    }
}

/// `GET /api/store/settings`
pub async fn settings(State(state): State<AppState>) -> ApiResponse<StoreSettings> {
    ApiResponse::ok(StoreSettings::from(state.config()))
}

/// `GET /api/shipping/zones`
pub async fn shipping_zones(State(state): State<AppState>) -> Result<ApiResponse<Vec<ShippingZone>>> {
    let zones = state.cache().shipping_zones(state.pool()).await?;
    Ok(ApiResponse::ok(zones))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::test_config;

    #[test]
    fn test_settings_from_config() {
        let settings = StoreSettings::from(&test_config());
        assert_eq!(settings.booking.slot_minutes, 30);
        assert!(settings.booking.utc_offset.starts_with('+'));
        assert_eq!(settings.currency, "USD");
        assert_eq!(settings.booking.utc_offset, "+00:00");
    }
}
