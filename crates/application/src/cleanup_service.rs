//! Retention purge for old orders.

use std::sync::Arc;

use butik_core::AppResult;
use chrono::Duration;

use crate::clock::Clock;
use crate::ports::OrderRepository;

/// Deletes `pending_payment` orders past the retention window. The worker
/// binary runs this on an interval; orders that ever carried a proof are
/// kept.
pub struct CleanupService {
    orders: Arc<dyn OrderRepository>,
    clock: Arc<dyn Clock>,
}

impl CleanupService {
    /// Creates the service.
    #[must_use]
    pub fn new(orders: Arc<dyn OrderRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { orders, clock }
    }

    /// Deletes stale unpaid orders created more than `max_age` ago. Returns
    /// the number
    /// of rows removed.
    pub async fn purge_stale_orders(&self, max_age: Duration) -> AppResult<u64> {
        let cutoff = self.clock.now() - max_age;
        let removed = self.orders.delete_pending_created_before(cutoff).await?;
        if removed > 0 {
            tracing::info!(removed, %cutoff, "pesanan lama dihapus");
        }
        Ok(removed)
    }
}
