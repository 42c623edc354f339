//! Admin console order operations.

use std::collections::HashMap;
use std::sync::Arc;

use butik_core::{AppError, AppResult};
use butik_domain::{Order, OrderId, OrderStatus};

use crate::notification_service::whatsapp_status_url;
use crate::ports::{ObjectStorage, OrderRepository, buckets};

/// Signed proof links stay valid long enough to open, not to share.
const PROOF_URL_TTL_SECONDS: u32 = 60 * 60;

/// Listing filter. Both fields combine with logical AND.
#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
    /// Case-insensitive substring over order number, name, email, phone.
    pub search: Option<String>,
    /// Exact status match.
    pub status: Option<OrderStatus>,
}

/// Dashboard counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderStats {
    /// Total number of orders.
    pub total: usize,
    /// Orders per status.
    pub by_status: HashMap<OrderStatus, usize>,
    /// Sum of `total_price` over non-cancelled orders, in rupiah.
    pub revenue: i64,
}

/// Result of an admin status update.
#[derive(Debug, Clone)]
pub struct StatusUpdateOutcome {
    /// The order after the write.
    pub order: Order,
    /// Pre-filled WhatsApp link for telling the buyer, when the new status
    /// has buyer-facing copy.
    pub whatsapp_url: Option<String>,
}

/// Order listing, stats, status transitions, and proof access for the
/// admin console.
pub struct AdminOrderService {
    orders: Arc<dyn OrderRepository>,
    storage: Arc<dyn ObjectStorage>,
}

impl AdminOrderService {
    /// Creates the service.
    #[must_use]
    pub fn new(orders: Arc<dyn OrderRepository>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { orders, storage }
    }

    /// Lists orders matching the query, newest first.
    pub async fn list(&self, query: &OrderQuery) -> AppResult<Vec<Order>> {
        let mut orders = self.orders.list_all().await?;

        if let Some(status) = query.status {
            orders.retain(|order| order.status == status);
        }
        if let Some(search) = query.search.as_deref() {
            let needle = search.trim().to_lowercase();
            if !needle.is_empty() {
                orders.retain(|order| {
                    [
                        order.order_number.as_str(),
                        order.customer_name.as_str(),
                        order.customer_email.as_str(),
                        order.customer_phone.as_str(),
                    ]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
                });
            }
        }

        Ok(orders)
    }

    /// Computes dashboard counters over all orders.
    pub async fn stats(&self) -> AppResult<OrderStats> {
        let orders = self.orders.list_all().await?;

        let mut by_status: HashMap<OrderStatus, usize> = HashMap::new();
        let mut revenue = 0i64;
        for order in &orders {
            *by_status.entry(order.status).or_insert(0) += 1;
            if order.status != OrderStatus::Cancelled {
                revenue += order.total_price;
            }
        }

        Ok(OrderStats {
            total: orders.len(),
            by_status,
            revenue,
        })
    }

    /// Moves an order to a new status, enforcing the lifecycle rules.
    ///
    /// Returns the updated order together with a ready-made WhatsApp link
    /// the admin can open to inform the buyer.
    pub async fn update_status(
        &self,
        order_id: OrderId,
        new_status: OrderStatus,
        tracking_number: Option<&str>,
    ) -> AppResult<StatusUpdateOutcome> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("pesanan tidak ditemukan".to_owned()))?;

        if !order.status.can_transition_to(new_status) {
            return Err(AppError::Validation(format!(
                "Status tidak dapat diubah dari {} ke {}",
                order.status, new_status
            )));
        }

        let updated = self.orders.update_status(order_id, new_status).await?;
        tracing::info!(
            order_number = %updated.order_number,
            from = %order.status,
            to = %new_status,
            "status pesanan diubah"
        );

        Ok(StatusUpdateOutcome {
            whatsapp_url: whatsapp_status_url(&updated, tracking_number),
            order: updated,
        })
    }

    /// Issues a short-lived signed URL for an order's payment proof.
    pub async fn proof_url(&self, order_id: OrderId) -> AppResult<String> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("pesanan tidak ditemukan".to_owned()))?;

        let stored = order
            .payment_proof_url
            .ok_or_else(|| AppError::NotFound("bukti pembayaran tidak ada".to_owned()))?;

        // Stored values are full public URLs; signing needs the bare object
        // name.
        let object_name = stored
            .rsplit('/')
            .next()
            .unwrap_or(stored.as_str())
            .to_owned();
        self.storage
            .create_signed_url(buckets::PAYMENT_PROOFS, &object_name, PROOF_URL_TTL_SECONDS)
            .await
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use butik_domain::{ConfirmationCode, OrderNumber, ShippingMethod};
    use chrono::{DateTime, Utc};
    use tokio::sync::Mutex;

    use crate::ports::NewOrder;

    use super::*;

    #[derive(Default)]
    struct FakeOrderRepository {
        orders: Mutex<Vec<Order>>,
    }

    #[async_trait]
    impl OrderRepository for FakeOrderRepository {
        async fn create_order_with_payment_proof(&self, _order: NewOrder) -> AppResult<Order> {
            Err(AppError::Internal("not used in these tests".to_owned()))
        }

        async fn find_by_id(&self, id: OrderId) -> AppResult<Option<Order>> {
            Ok(self
                .orders
                .lock()
                .await
                .iter()
                .find(|order| order.id == id)
                .cloned())
        }

        async fn find_by_order_number(
            &self,
            order_number: &OrderNumber,
        ) -> AppResult<Option<Order>> {
            Ok(self
                .orders
                .lock()
                .await
                .iter()
                .find(|order| order.order_number == *order_number)
                .cloned())
        }

        async fn find_for_customer(
            &self,
            _order_number: &OrderNumber,
            _confirmation_code: &str,
        ) -> AppResult<Option<Order>> {
            Ok(None)
        }

        async fn list_all(&self) -> AppResult<Vec<Order>> {
            Ok(self.orders.lock().await.clone())
        }

        async fn update_status(&self, id: OrderId, status: OrderStatus) -> AppResult<Order> {
            let mut orders = self.orders.lock().await;
            let order = orders
                .iter_mut()
                .find(|order| order.id == id)
                .ok_or_else(|| AppError::NotFound("order".to_owned()))?;
            order.status = status;
            Ok(order.clone())
        }

        async fn delete_pending_created_before(&self, _cutoff: DateTime<Utc>) -> AppResult<u64> {
            Ok(0)
        }
    }

    struct FakeStorage;

    #[async_trait]
    impl ObjectStorage for FakeStorage {
        async fn upload(
            &self,
            _bucket: &str,
            _object_name: &str,
            _content_type: &str,
            _bytes: Vec<u8>,
        ) -> AppResult<()> {
            Ok(())
        }

        fn public_url(&self, bucket: &str, object_name: &str) -> String {
            format!("https://storage.test/{bucket}/{object_name}")
        }

        async fn create_signed_url(
            &self,
            bucket: &str,
            object_name: &str,
            _expires_in_seconds: u32,
        ) -> AppResult<String> {
            Ok(format!("https://storage.test/signed/{bucket}/{object_name}"))
        }
    }

    fn order(number: &str, name: &str, status: OrderStatus, total: i64) -> Order {
        Order {
            id: OrderId::new(),
            order_number: OrderNumber::parse(number).unwrap_or_else(|_| unreachable!()),
            customer_name: name.to_owned(),
            customer_email: "budi@gmail.com".to_owned(),
            customer_phone: "08123456789".to_owned(),
            customer_address: "Jl. Merdeka No. 45".to_owned(),
            shipping_method: ShippingMethod::JneReg,
            product_name: "Emas Batangan".to_owned(),
            product_weight: "1 gram".to_owned(),
            product_price: total,
            quantity: 1,
            total_price: total,
            payment_proof_url: Some("https://storage.test/payment-proofs/abc123.jpg".to_owned()),
            status,
            confirmation_code: ConfirmationCode::from_string("AB12CD"),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service_with(orders: Vec<Order>) -> (AdminOrderService, Arc<FakeOrderRepository>) {
        let repository = Arc::new(FakeOrderRepository {
            orders: Mutex::new(orders),
        });
        (
            AdminOrderService::new(Arc::clone(&repository) as _, Arc::new(FakeStorage)),
            repository,
        )
    }

    #[tokio::test]
    async fn search_matches_number_and_name_case_insensitively() {
        let (service, _) = service_with(vec![
            order("BMA-AAA", "Budi Santoso", OrderStatus::Processing, 1_000),
            order("BMA-BBB", "Siti Aminah", OrderStatus::Processing, 2_000),
        ]);

        let by_name = service
            .list(&OrderQuery {
                search: Some("siti".to_owned()),
                status: None,
            })
            .await;
        assert_eq!(by_name.map(|orders| orders.len()).ok(), Some(1));

        let by_number = service
            .list(&OrderQuery {
                search: Some("bma-aaa".to_owned()),
                status: None,
            })
            .await;
        assert_eq!(by_number.map(|orders| orders.len()).ok(), Some(1));
    }

    #[tokio::test]
    async fn status_filter_combines_with_search() {
        let (service, _) = service_with(vec![
            order("BMA-AAA", "Budi Santoso", OrderStatus::Processing, 1_000),
            order("BMA-BBB", "Budi Hartono", OrderStatus::Shipped, 2_000),
        ]);

        let filtered = service
            .list(&OrderQuery {
                search: Some("budi".to_owned()),
                status: Some(OrderStatus::Shipped),
            })
            .await;
        let numbers: Vec<String> = filtered
            .map(|orders| {
                orders
                    .iter()
                    .map(|order| order.order_number.as_str().to_owned())
                    .collect()
            })
            .unwrap_or_default();
        assert_eq!(numbers, vec!["BMA-BBB".to_owned()]);
    }

    #[tokio::test]
    async fn revenue_ignores_cancelled_orders() {
        let (service, _) = service_with(vec![
            order("BMA-AAA", "Budi Santoso", OrderStatus::Completed, 1_000_000),
            order("BMA-BBB", "Siti Aminah", OrderStatus::Cancelled, 9_000_000),
            order("BMA-CCC", "Andi Wijaya", OrderStatus::Processing, 500_000),
        ]);

        let stats = service.stats().await;
        let stats = stats.unwrap_or_else(|_| unreachable!());
        assert_eq!(stats.total, 3);
        assert_eq!(stats.revenue, 1_500_000);
        assert_eq!(stats.by_status.get(&OrderStatus::Cancelled), Some(&1));
    }

    #[tokio::test]
    async fn forward_transition_returns_a_whatsapp_link() {
        let fresh = order("BMA-AAA", "Budi Santoso", OrderStatus::Processing, 1_000);
        let id = fresh.id;
        let (service, _) = service_with(vec![fresh]);

        let outcome = service
            .update_status(id, OrderStatus::Shipped, Some("JNE123"))
            .await;
        let outcome = outcome.unwrap_or_else(|_| unreachable!());
        assert_eq!(outcome.order.status, OrderStatus::Shipped);
        let url = outcome.whatsapp_url.unwrap_or_default();
        assert!(url.starts_with("https://wa.me/628123456789?text="));
    }

    #[tokio::test]
    async fn backward_transition_is_rejected() {
        let fresh = order("BMA-AAA", "Budi Santoso", OrderStatus::Shipped, 1_000);
        let id = fresh.id;
        let (service, repository) = service_with(vec![fresh]);

        let result = service
            .update_status(id, OrderStatus::PaymentUploaded, None)
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let stored = repository.orders.lock().await;
        assert_eq!(stored[0].status, OrderStatus::Shipped);
    }

    #[tokio::test]
    async fn proof_url_signs_the_bare_object_name() {
        let fresh = order("BMA-AAA", "Budi Santoso", OrderStatus::PaymentUploaded, 1_000);
        let id = fresh.id;
        let (service, _) = service_with(vec![fresh]);

        let url = service.proof_url(id).await;
        assert_eq!(
            url.ok(),
            Some("https://storage.test/signed/payment-proofs/abc123.jpg".to_owned())
        );
    }
}
