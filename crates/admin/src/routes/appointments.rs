//! Appointment schedule and status changes.

use axum::extract::{Path, State};
use chrono::NaiveDate;
use salon_shop_core::booking::local_day_bounds;
use salon_shop_core::{AppointmentId, AppointmentStatus, StylistId};
use salon_shop_storefront::api::{ApiJson, ApiQuery, ApiResponse, PageParams, Paginated};
use salon_shop_storefront::db::{AppointmentFilter, AppointmentRepository};
use salon_shop_storefront::models::Appointment;
use serde::Deserialize;
use tracing::instrument;

use super::not_found;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::services::status;
use crate::state::AppState;

/// `GET /api/admin/appointments` query. `date` is a salon-local day.
#[derive(Debug, Default, Deserialize)]
pub struct AppointmentListQuery {
    pub status: Option<AppointmentStatus>,
    pub date: Option<NaiveDate>,
    pub stylist_id: Option<StylistId>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// `PATCH /api/admin/appointments/{id}/status` body.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: AppointmentStatus,
}

#[instrument(skip(_admin, state))]
pub async fn index(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AppointmentListQuery>,
) -> Result<ApiResponse<Paginated<Appointment>>> {
    let offset = state.config().utc_offset;
    let between = query
        .date
        .map(|date| {
            local_day_bounds(date, offset).ok_or_else(|| AppError::BadRequest("Invalid date".to_string()))
        })
        .transpose()?;
    let filter = AppointmentFilter {
        status: query.status,
        between,
        stylist_id: query.stylist_id,
    };
    let params = PageParams {
        page: query.page,
        per_page: query.per_page,
    };
    let (appointments, total) = AppointmentRepository::new(state.pool())
        .list(&filter, params)
        .await?;
    Ok(ApiResponse::ok(Paginated::new(appointments, total, params)))
}

pub async fn show(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<AppointmentId>,
) -> Result<ApiResponse<Appointment>> {
    let appointment = AppointmentRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| not_found("Appointment"))?;
    Ok(ApiResponse::ok(appointment))
}

#[instrument(skip(_admin, state), fields(status = %update.status))]
pub async fn update_status(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<AppointmentId>,
    ApiJson(update): ApiJson<StatusUpdate>,
) -> Result<ApiResponse<Appointment>> {
    let appointment = status::change_appointment_status(state.pool(), id, update.status).await?;
    Ok(ApiResponse::ok(appointment))
}
