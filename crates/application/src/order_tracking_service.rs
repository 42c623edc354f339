//! Buyer self-service: order lookup and the single allowed transition.

use std::sync::Arc;

use butik_core::{AppError, AppResult};
use butik_domain::{Order, OrderNumber, OrderStatus};

use crate::ports::OrderRepository;

/// Lets a buyer view their order and mark it paid, gated by the
/// confirmation code issued at submission.
pub struct OrderTrackingService {
    orders: Arc<dyn OrderRepository>,
}

impl OrderTrackingService {
    /// Creates the service.
    #[must_use]
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    /// Looks up an order for its buyer.
    ///
    /// A wrong code behaves exactly like a missing order so the endpoint
    /// cannot be used to probe which order numbers exist.
    pub async fn find_order(
        &self,
        order_number: &OrderNumber,
        confirmation_code: &str,
    ) -> AppResult<Order> {
        self.orders
            .find_for_customer(order_number, confirmation_code)
            .await?
            .ok_or_else(|| AppError::NotFound("pesanan tidak ditemukan".to_owned()))
    }

    /// Buyer-triggered transition from `payment_uploaded` to `processing`.
    ///
    /// Re-confirming an order already in `processing` succeeds without a
    /// write, so double taps are harmless. Any other state is rejected.
    pub async fn confirm_processing(
        &self,
        order_number: &OrderNumber,
        confirmation_code: &str,
    ) -> AppResult<Order> {
        let order = self
            .orders
            .find_by_order_number(order_number)
            .await?
            .ok_or_else(|| AppError::NotFound("pesanan tidak ditemukan".to_owned()))?;

        if !order.confirmation_code.matches(confirmation_code) {
            return Err(AppError::Unauthorized(
                "Kode konfirmasi tidak valid".to_owned(),
            ));
        }

        match order.status {
            OrderStatus::Processing => Ok(order),
            OrderStatus::PaymentUploaded => {
                let updated = self
                    .orders
                    .update_status(order.id, OrderStatus::Processing)
                    .await?;
                tracing::info!(
                    order_number = %updated.order_number,
                    "pembeli mengkonfirmasi pembayaran"
                );
                Ok(updated)
            }
            _ => Err(AppError::Conflict(
                "Pesanan tidak dalam status menunggu konfirmasi".to_owned(),
            )),
        }
    }
}
