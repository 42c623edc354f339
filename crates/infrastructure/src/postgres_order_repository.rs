//! PostgreSQL-backed order repository.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use butik_application::{NewOrder, OrderRepository};
use butik_core::{AppError, AppResult};
use butik_domain::{ConfirmationCode, Order, OrderId, OrderNumber, OrderStatus, ShippingMethod};

/// PostgreSQL implementation of the order repository port.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: uuid::Uuid,
    order_number: String,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    customer_address: String,
    shipping_method: String,
    product_name: String,
    product_weight: String,
    product_price: i64,
    quantity: i32,
    total_price: i64,
    payment_proof_url: Option<String>,
    status: String,
    confirmation_code: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = AppError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OrderId::from_uuid(row.id),
            order_number: OrderNumber::parse(row.order_number)?,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            customer_address: row.customer_address,
            shipping_method: ShippingMethod::from_str(&row.shipping_method)?,
            product_name: row.product_name,
            product_weight: row.product_weight,
            product_price: row.product_price,
            quantity: row.quantity,
            total_price: row.total_price,
            payment_proof_url: row.payment_proof_url,
            status: OrderStatus::from_str(&row.status)?,
            confirmation_code: ConfirmationCode::from_string(row.confirmation_code),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const ORDER_COLUMNS: &str = r"
    id, order_number, customer_name, customer_email, customer_phone,
    customer_address, shipping_method, product_name, product_weight,
    product_price, quantity, total_price, payment_proof_url, status,
    confirmation_code, created_at, updated_at
";

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn create_order_with_payment_proof(&self, order: NewOrder) -> AppResult<Order> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO orders (
                id, order_number, customer_name, customer_email, customer_phone,
                customer_address, shipping_method, product_name, product_weight,
                product_price, quantity, total_price, payment_proof_url, status,
                confirmation_code, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, NOW(), NOW())
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(OrderId::new().as_uuid())
        .bind(order.order_number.as_str())
        .bind(&order.customer_name)
        .bind(&order.customer_email)
        .bind(&order.customer_phone)
        .bind(&order.customer_address)
        .bind(order.shipping_method.as_str())
        .bind(&order.product_name)
        .bind(&order.product_weight)
        .bind(order.product_price)
        .bind(order.quantity)
        .bind(order.total_price)
        .bind(&order.payment_proof_url)
        .bind(OrderStatus::PaymentUploaded.as_str())
        .bind(order.confirmation_code.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create order: {error}")))?;

        Order::try_from(row)
    }

    async fn find_by_id(&self, id: OrderId) -> AppResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 LIMIT 1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find order by id: {error}")))?;

        row.map(Order::try_from).transpose()
    }

    async fn find_by_order_number(&self, order_number: &OrderNumber) -> AppResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = $1 LIMIT 1"
        ))
        .bind(order_number.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find order by number: {error}")))?;

        row.map(Order::try_from).transpose()
    }

    async fn find_for_customer(
        &self,
        order_number: &OrderNumber,
        confirmation_code: &str,
    ) -> AppResult<Option<Order>> {
        // The code gate lives in the query: a wrong code is indistinguishable
        // from a missing order.
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE order_number = $1
              AND UPPER(confirmation_code) = UPPER($2)
            LIMIT 1
            "
        ))
        .bind(order_number.as_str())
        .bind(confirmation_code.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find customer order: {error}")))?;

        row.map(Order::try_from).transpose()
    }

    async fn list_all(&self) -> AppResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list orders: {error}")))?;

        rows.into_iter().map(Order::try_from).collect()
    }

    async fn update_status(&self, id: OrderId, status: OrderStatus) -> AppResult<Order> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE orders
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(id.as_uuid())
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update order status: {error}")))?
        .ok_or_else(|| AppError::NotFound("pesanan tidak ditemukan".to_owned()))?;

        Order::try_from(row)
    }

    async fn delete_pending_created_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result =
            sqlx::query("DELETE FROM orders WHERE status = 'pending_payment' AND created_at < $1")
                .bind(cutoff)
                .execute(&self.pool)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to delete old orders: {error}"))
                })?;

        Ok(result.rows_affected())
    }
}
