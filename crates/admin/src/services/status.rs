//! Order and appointment status changes.
//!
//! Both run in one transaction with the row locked, so two admins changing
//! the same order cannot both apply a transition from the same old status.

use std::fmt::Display;

use salon_shop_core::{AppointmentId, AppointmentStatus, OrderId, OrderStatus};
use salon_shop_storefront::db::{
    AppointmentRepository, CustomerRepository, OrderRepository, ProductRepository,
};
use salon_shop_storefront::models::{Appointment, OrderWithItems};
use sqlx::PgPool;
use tracing::instrument;

use crate::error::{AppError, Result};

fn check_transition<S: Display>(from: S, to: S, allowed: bool) -> Result<()> {
    if allowed {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Cannot change status from {from} to {to}"
        )))
    }
}

/// Move an order to `next`.
///
/// Cancelling puts every ordered unit back in stock (untracked products are
/// skipped) and takes the order off the customer's totals.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown order and
/// `AppError::BadRequest` for a transition the lifecycle does not allow.
#[instrument(skip(pool))]
pub async fn change_order_status(
    pool: &PgPool,
    id: OrderId,
    next: OrderStatus,
) -> Result<OrderWithItems> {
    let mut tx = pool.begin().await?;

    let order = OrderRepository::lock(&mut tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
    check_transition(order.status, next, order.status.can_transition_to(next))?;

    let items = OrderRepository::items_in(&mut tx, id).await?;

    if next == OrderStatus::Cancelled {
        for item in &items {
            ProductRepository::restock(&mut tx, item.product_id, item.quantity).await?;
        }
        CustomerRepository::reverse_order(&mut tx, order.customer_id, order.total).await?;
    }

    let order = OrderRepository::set_status(&mut tx, id, next).await?;
    tx.commit().await?;

    tracing::info!(
        order_number = %order.order_number,
        status = %next,
        "Order status changed"
    );
    Ok(OrderWithItems { order, items })
}

/// Move an appointment to `next`.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown appointment and
/// `AppError::BadRequest` for a transition the lifecycle does not allow.
#[instrument(skip(pool))]
pub async fn change_appointment_status(
    pool: &PgPool,
    id: AppointmentId,
    next: AppointmentStatus,
) -> Result<Appointment> {
    let mut tx = pool.begin().await?;

    let appointment = AppointmentRepository::lock(&mut tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;
    check_transition(
        appointment.status,
        next,
        appointment.status.can_transition_to(next),
    )?;

    let appointment = AppointmentRepository::set_status(&mut tx, id, next).await?;
    tx.commit().await?;

    tracing::info!(appointment_id = %id, status = %next, "Appointment status changed");
    Ok(appointment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_transition_message() {
        let from = OrderStatus::Delivered;
        let to = OrderStatus::Pending;
        let err = check_transition(from, to, from.can_transition_to(to));
        assert!(
            matches!(err, Err(AppError::BadRequest(ref m)) if m == "Cannot change status from delivered to pending")
        );
    }

    #[test]
    fn test_allowed_transition() {
        let from = AppointmentStatus::Confirmed;
        let to = AppointmentStatus::NoShow;
        assert!(check_transition(from, to, from.can_transition_to(to)).is_ok());
    }
}
