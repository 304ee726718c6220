//! Dashboard counters.

use rust_decimal::Decimal;
use salon_shop_core::OrderStatus;
use salon_shop_storefront::db::RepositoryError;
use serde::Serialize;
use sqlx::PgPool;
use tracing::instrument;

/// Orders in one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

/// `GET /api/admin/dashboard` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    /// Every status is listed, zero counts included.
    pub orders_by_status: Vec<StatusCount>,
    pub total_orders: i64,
    /// Sum of `total` over orders that were not cancelled.
    pub revenue: Decimal,
    pub pending_appointments: i64,
    pub upcoming_appointments: i64,
    pub customers: i64,
}

impl DashboardStats {
    fn from_counts(
        counts: &[StatusCount],
        revenue: Decimal,
        pending_appointments: i64,
        upcoming_appointments: i64,
        customers: i64,
    ) -> Self {
        let orders_by_status: Vec<StatusCount> = OrderStatus::ALL
            .iter()
            .map(|&status| StatusCount {
                status,
                count: counts
                    .iter()
                    .find(|c| c.status == status)
                    .map_or(0, |c| c.count),
            })
            .collect();

        Self {
            total_orders: orders_by_status.iter().map(|c| c.count).sum(),
            orders_by_status,
            revenue,
            pending_appointments,
            upcoming_appointments,
            customers,
        }
    }
}

/// Repository for dashboard aggregates.
pub struct DashboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DashboardRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails.
    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<DashboardStats, RepositoryError> {
        let counts = sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM shop.orders GROUP BY status",
        )
        .fetch_all(self.pool)
        .await?;

        let (revenue,): (Decimal,) = sqlx::query_as(
            "SELECT COALESCE(SUM(total), 0) FROM shop.orders WHERE status <> 'cancelled'",
        )
        .fetch_one(self.pool)
        .await?;

        let (pending, upcoming): (i64, i64) = sqlx::query_as(
            r"
            SELECT
                COUNT(*) FILTER (WHERE status = 'pending'),
                COUNT(*) FILTER (WHERE status IN ('pending', 'confirmed') AND scheduled_at >= NOW())
            FROM shop.appointments
            ",
        )
        .fetch_one(self.pool)
        .await?;

        let (customers,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM shop.customers")
            .fetch_one(self.pool)
            .await?;

        Ok(DashboardStats::from_counts(
            &counts, revenue, pending, upcoming, customers,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_statuses_count_zero() {
        let counts = [
            StatusCount {
                status: OrderStatus::Pending,
                count: 3,
            },
            StatusCount {
                status: OrderStatus::Cancelled,
                count: 1,
            },
        ];
        let stats = DashboardStats::from_counts(&counts, Decimal::new(12050, 2), 2, 5, 9);

        assert_eq!(stats.orders_by_status.len(), OrderStatus::ALL.len());
        assert_eq!(stats.total_orders, 4);
        assert_eq!(
            stats
                .orders_by_status
                .iter()
                .find(|c| c.status == OrderStatus::Shipped)
                .map(|c| c.count),
            Some(0)
        );
        assert_eq!(stats.revenue, Decimal::new(12050, 2));
    }
}
