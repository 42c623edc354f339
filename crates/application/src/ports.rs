//! Ports implemented by the infrastructure crate.

use async_trait::async_trait;
use butik_core::{AdminId, AppResult};
use butik_domain::{
    ConfirmationCode, GoldPrice, Order, OrderId, OrderNumber, OrderStatus, Product, ProductId,
    ProductInput, ShippingMethod,
};
use chrono::{DateTime, Utc};

/// Object-storage bucket names.
pub mod buckets {
    /// Buyer payment-proof images. Written on submit; admin reads via
    /// signed URLs only.
    pub const PAYMENT_PROOFS: &str = "payment-proofs";
    /// The QRIS payment code shown on the payment step.
    pub const QR_CODES: &str = "qr-codes";
    /// Catalog imagery.
    pub const PRODUCT_IMAGES: &str = "product-images";
}

/// Fields for creating an order together with its payment proof.
///
/// Creation is a single atomic operation: the storefront never inserts into
/// the orders table directly.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Pre-generated order number.
    pub order_number: OrderNumber,
    /// Buyer full name.
    pub customer_name: String,
    /// Buyer email.
    pub customer_email: String,
    /// Buyer WhatsApp number.
    pub customer_phone: String,
    /// Composed shipping address.
    pub customer_address: String,
    /// Selected shipping method.
    pub shipping_method: ShippingMethod,
    /// Product name snapshot.
    pub product_name: String,
    /// Product weight label.
    pub product_weight: String,
    /// Unit price snapshot in rupiah.
    pub product_price: i64,
    /// Quantity ordered.
    pub quantity: i32,
    /// Total including shipping, in rupiah.
    pub total_price: i64,
    /// Object path of the uploaded proof.
    pub payment_proof_url: String,
    /// Server-issued code for buyer self-service.
    pub confirmation_code: ConfirmationCode,
}

/// Repository port for order persistence.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Creates the order atomically with its payment proof, starting in
    /// `payment_uploaded`.
    async fn create_order_with_payment_proof(&self, order: NewOrder) -> AppResult<Order>;

    /// Looks up an order by its row identifier.
    async fn find_by_id(&self, id: OrderId) -> AppResult<Option<Order>>;

    /// Looks up an order by order number without any code gate. Admin- and
    /// notification-path only.
    async fn find_by_order_number(&self, order_number: &OrderNumber) -> AppResult<Option<Order>>;

    /// Buyer-facing lookup: returns the order only when the confirmation
    /// code matches (case-insensitive). A wrong code yields no row.
    async fn find_for_customer(
        &self,
        order_number: &OrderNumber,
        confirmation_code: &str,
    ) -> AppResult<Option<Order>>;

    /// Returns all orders, newest first.
    async fn list_all(&self) -> AppResult<Vec<Order>>;

    /// Sets the status and bumps `updated_at`. Setting the current status
    /// again is a no-op apart from `updated_at`.
    async fn update_status(&self, id: OrderId, status: OrderStatus) -> AppResult<Order>;

    /// Deletes `pending_payment` orders created before the cutoff. Returns
    /// the removed count. Orders that progressed past the initial state are
    /// never touched.
    async fn delete_pending_created_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;
}

/// Repository port for the product catalog.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Returns purchasable products in grid order.
    async fn list_active(&self) -> AppResult<Vec<Product>>;

    /// Returns every product, including inactive ones.
    async fn list_all(&self) -> AppResult<Vec<Product>>;

    /// Looks up one product.
    async fn find_by_id(&self, id: ProductId) -> AppResult<Option<Product>>;

    /// Inserts a product.
    async fn create(&self, input: ProductInput) -> AppResult<Product>;

    /// Updates a product in place.
    async fn update(&self, id: ProductId, input: ProductInput) -> AppResult<Product>;

    /// Removes a product.
    async fn delete(&self, id: ProductId) -> AppResult<()>;
}

/// Repository port for the gold price board.
#[async_trait]
pub trait GoldPriceRepository: Send + Sync {
    /// Returns the current prices, if set.
    async fn get(&self) -> AppResult<Option<GoldPrice>>;

    /// Replaces the current prices.
    async fn upsert(&self, buy_price: i64, sell_price: i64) -> AppResult<GoldPrice>;
}

/// A stored admin account.
#[derive(Debug, Clone)]
pub struct AdminAccount {
    /// Row identifier.
    pub id: AdminId,
    /// Login email, lower-cased.
    pub email: String,
    /// Argon2 hash of the password.
    pub password_hash: String,
    /// Display name shown in the console.
    pub display_name: String,
}

/// Repository port for admin accounts.
#[async_trait]
pub trait AdminAccountRepository: Send + Sync {
    /// Number of existing admin accounts.
    async fn count(&self) -> AppResult<i64>;

    /// Looks up an account by email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<AdminAccount>>;

    /// Inserts an account.
    async fn create(
        &self,
        email: &str,
        password_hash: &str,
        display_name: &str,
    ) -> AppResult<AdminAccount>;
}

/// Password hashing port.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password for storage.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

/// Object-storage port covering the three storefront buckets.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Uploads an object.
    async fn upload(
        &self,
        bucket: &str,
        object_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> AppResult<()>;

    /// Returns the public URL of an object in a public bucket.
    fn public_url(&self, bucket: &str, object_name: &str) -> String;

    /// Creates a short-lived signed URL for a private object.
    async fn create_signed_url(
        &self,
        bucket: &str,
        object_name: &str,
        expires_in_seconds: u32,
    ) -> AppResult<String>;
}

/// Port for the out-of-band admin alert channel (Telegram).
#[async_trait]
pub trait AdminMessenger: Send + Sync {
    /// Delivers one alert message to the admin channel.
    async fn send_admin_alert(&self, text: &str) -> AppResult<()>;
}

/// One level of the Indonesian administrative hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Directory identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Port for the cascading region directory.
#[async_trait]
pub trait RegionDirectory: Send + Sync {
    /// All provinces.
    async fn provinces(&self) -> AppResult<Vec<Region>>;

    /// Regencies of a province.
    async fn regencies(&self, province_id: &str) -> AppResult<Vec<Region>>;

    /// Districts of a regency.
    async fn districts(&self, regency_id: &str) -> AppResult<Vec<Region>>;

    /// Villages of a district.
    async fn villages(&self, district_id: &str) -> AppResult<Vec<Region>>;
}
